//! # mailhook-mime
//!
//! Lenient MIME document parsing for the mailhook gateway.
//!
//! This crate parses raw mail text into a tree of parts and exposes the
//! accessors the gateway needs: top-level headers, leaf-part
//! classification, declared filenames, and transfer-decoded payloads.
//!
//! Parsing is deliberately tolerant. Mail arriving over SMTP is often
//! malformed, and a gateway that drops messages over a bad header is
//! worse than one that forwards a partial record. Malformed input
//! degrades to empty headers or raw bytes; it never fails the caller.
//!
//! ## Quick Start
//!
//! ```
//! use mailhook_mime::Document;
//!
//! let raw = "From: sender@example.com\r\n\
//!            To: recipient@example.com\r\n\
//!            Subject: Test\r\n\
//!            \r\n\
//!            Hello, World!";
//!
//! let doc = Document::parse(raw);
//! assert_eq!(doc.subject(), Some("Test"));
//! assert_eq!(doc.root.body_text(), "Hello, World!");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Body, Document, Part, TransferEncoding};
