//! # mailhook-smtp
//!
//! Server-side SMTP (RFC 5321) for the mailhook gateway.
//!
//! This crate implements the receiving half of the protocol: reply
//! formatting, inbound command parsing, and the per-connection session
//! state machine. What happens to an accepted message is decided by a
//! [`MessageDelivery`] implementation supplied by the caller; the
//! protocol layer never sees the forwarding pipeline.
//!
//! ## Message lifecycle
//!
//! ```text
//! AwaitingGreeting ── HELO/EHLO ──→ AwaitingSender
//! AwaitingSender ──── MAIL FROM ──→ AwaitingRecipient
//! AwaitingRecipient ─ RCPT TO ────→ AwaitingRecipient (handle per recipient)
//! AwaitingRecipient ─ DATA ───────→ ReceivingBody
//! ReceivingBody ───── "." ────────→ commit, back to AwaitingSender
//! ```
//!
//! Every accepted `RCPT TO` yields its own [`Transaction`] handle; body
//! lines fan out to all of them and each commits independently. A
//! dropped connection aborts all pending handles without delivery.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
mod delivery;
mod error;
mod server;
mod session;
pub mod types;

pub use command::Command;
pub use delivery::{MessageDelivery, Transaction};
pub use error::{Error, Result};
pub use server::Server;
pub use session::{Session, SessionState};
pub use types::{Address, Reply, ReplyCode};
