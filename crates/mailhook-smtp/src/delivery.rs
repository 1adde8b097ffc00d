//! The delivery seam between the protocol layer and the gateway.

use crate::error::Result;
use crate::types::Address;

/// One in-progress inbound message bound to a single recipient.
///
/// Created by [`MessageDelivery::validate_recipient`] when a recipient
/// is accepted; fed body lines during the DATA phase; consumed by
/// either [`commit`](Transaction::commit) or
/// [`abort`](Transaction::abort). Consuming the handle releases the
/// buffered lines; a committed or aborted transaction cannot receive
/// further lines.
pub trait Transaction: Send {
    /// Appends one body line (terminator already stripped).
    fn append_line(&mut self, line: &str);

    /// Completes the message.
    ///
    /// Must not block on network I/O: the protocol layer acknowledges
    /// the message to the remote client immediately after this call
    /// returns, regardless of what delivery later does with the
    /// buffered text.
    fn commit(self: Box<Self>);

    /// Discards the buffered message without delivery (transport
    /// failure or reset).
    fn abort(self: Box<Self>);
}

impl core::fmt::Debug for dyn Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Transaction")
    }
}

/// Capability object deciding which envelopes a session may accept.
///
/// One implementation is shared by every session of a server; it holds
/// whatever routing state the gateway needs.
pub trait MessageDelivery: Send + Sync {
    /// Validates the sender declared by `MAIL FROM`.
    ///
    /// The default accepts every sender unconditionally and returns the
    /// origin unchanged; there is no sender authentication.
    fn validate_sender(&self, _helo: &str, origin: &str) -> String {
        origin.to_string()
    }

    /// Validates a recipient declared by `RCPT TO`.
    ///
    /// On success returns a fresh [`Transaction`] bound to that
    /// recipient's destination.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnknownRecipient`] when the recipient's domain
    /// is not routable; the session rejects that single recipient and
    /// continues.
    fn validate_recipient(&self, recipient: &Address) -> Result<Box<dyn Transaction>>;
}
