//! # mailhook-core
//!
//! The gateway pipeline behind the SMTP listener: resolve the
//! recipient's domain to a callback URL, flatten the accepted mail
//! document into named fields and attachments, encode them as
//! `multipart/form-data`, and POST the result to the callback.
//!
//! Delivery is best-effort and decoupled from SMTP acceptance: the
//! forward runs on its own task, its outcome is logged and never
//! reported back to the mail session. There is no queue and no retry.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod delivery;
mod error;
mod form;
mod forward;
mod record;
mod route;

pub use delivery::WebhookDelivery;
pub use error::{Error, Result};
pub use form::{EncodedForm, encode};
pub use forward::Forwarder;
pub use record::{ATTACHMENT_FIELD, Attachment, MailRecord};
pub use route::{RouteTable, WILDCARD};
