//! Core SMTP types (addresses and replies).

mod address;
mod reply;

pub use address::Address;
pub use reply::{Reply, ReplyCode};
