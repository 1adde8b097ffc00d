//! SMTP session state machine.

use std::sync::Arc;

use crate::command::Command;
use crate::delivery::{MessageDelivery, Transaction};
use crate::error::Error;
use crate::types::{Reply, ReplyCode};

/// Current phase of an SMTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the client to introduce itself (HELO/EHLO).
    AwaitingGreeting,
    /// Greeted; waiting for `MAIL FROM`.
    AwaitingSender,
    /// Sender accepted; waiting for `RCPT TO` (and then DATA).
    AwaitingRecipient,
    /// DATA accepted; buffering body lines until the dot terminator.
    ReceivingBody,
}

/// One SMTP session over one connection.
///
/// A session processes many messages sequentially; each commit or RSET
/// returns it to [`SessionState::AwaitingSender`].
pub struct Session {
    hostname: String,
    delivery: Arc<dyn MessageDelivery>,
    state: SessionState,
    helo: Option<String>,
    sender: Option<String>,
    transactions: Vec<Box<dyn Transaction>>,
}

impl Session {
    /// Creates a session bound to a delivery capability.
    pub fn new(hostname: impl Into<String>, delivery: Arc<dyn MessageDelivery>) -> Self {
        Self {
            hostname: hostname.into(),
            delivery,
            state: SessionState::AwaitingGreeting,
            helo: None,
            sender: None,
            transactions: Vec::new(),
        }
    }

    /// The `220` banner sent when the connection opens.
    #[must_use]
    pub fn greeting(&self) -> Reply {
        Reply::new(
            ReplyCode::SERVICE_READY,
            format!("{} Service ready", self.hostname),
        )
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true while body lines are being collected.
    #[must_use]
    pub fn in_data_mode(&self) -> bool {
        self.state == SessionState::ReceivingBody
    }

    /// Handles one command line and produces the reply to send.
    pub fn handle_command(&mut self, line: &str) -> Reply {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(Error::InvalidAddress(msg)) => {
                return Reply::new(ReplyCode::PARAMETER_ERROR, msg);
            }
            Err(_) => return Reply::syntax_error(),
        };

        match command {
            Command::Helo(domain) | Command::Ehlo(domain) => self.handle_greeting(&domain),
            Command::MailFrom(origin) => self.handle_mail(&origin),
            Command::RcptTo(recipient) => self.handle_rcpt(&recipient),
            Command::Data => self.handle_data(),
            Command::Rset => self.handle_rset(),
            Command::Noop => Reply::ok(),
            Command::Vrfy(_) => Reply::new(ReplyCode::NOT_IMPLEMENTED, "VRFY not implemented"),
            Command::Quit => self.handle_quit(),
        }
    }

    /// Handles one line during the DATA phase.
    ///
    /// Returns `None` while collecting; returns the final reply when
    /// the dot terminator commits the message. The reply is produced
    /// before any forwarding result exists: acceptance is decoupled
    /// from delivery.
    pub fn handle_data_line(&mut self, line: &str) -> Option<Reply> {
        if line == "." {
            for transaction in self.transactions.drain(..) {
                transaction.commit();
            }
            self.sender = None;
            self.state = SessionState::AwaitingSender;
            return Some(Reply::ok());
        }

        // Undo dot-stuffing (RFC 5321, section 4.5.2)
        let line = line.strip_prefix('.').unwrap_or(line);

        for transaction in &mut self.transactions {
            transaction.append_line(line);
        }
        None
    }

    /// Aborts the session: transport failed, buffered lines are
    /// discarded, nothing is delivered.
    pub fn abort(&mut self) {
        for transaction in self.transactions.drain(..) {
            transaction.abort();
        }
        self.sender = None;
    }

    fn handle_greeting(&mut self, domain: &str) -> Reply {
        self.discard_transactions();
        self.helo = Some(domain.to_string());
        self.sender = None;
        self.state = SessionState::AwaitingSender;
        Reply::new(ReplyCode::OK, format!("{} Hello {domain}", self.hostname))
    }

    fn handle_mail(&mut self, origin: &str) -> Reply {
        if self.state != SessionState::AwaitingSender
            && self.state != SessionState::AwaitingRecipient
        {
            return Reply::bad_sequence();
        }

        self.discard_transactions();
        let helo = self.helo.as_deref().unwrap_or_default();
        let accepted = self.delivery.validate_sender(helo, origin);
        self.sender = Some(accepted);
        self.state = SessionState::AwaitingRecipient;
        Reply::ok()
    }

    fn handle_rcpt(&mut self, recipient: &crate::types::Address) -> Reply {
        if self.state != SessionState::AwaitingRecipient || self.sender.is_none() {
            return Reply::bad_sequence();
        }

        match self.delivery.validate_recipient(recipient) {
            Ok(transaction) => {
                self.transactions.push(transaction);
                Reply::ok()
            }
            Err(Error::UnknownRecipient(_)) => {
                tracing::debug!(recipient = %recipient, "rejected unroutable recipient");
                Reply::new(
                    ReplyCode::MAILBOX_UNAVAILABLE,
                    format!("No such recipient here: {recipient}"),
                )
            }
            Err(e) => Reply::new(ReplyCode::LOCAL_ERROR, e.to_string()),
        }
    }

    fn handle_data(&mut self) -> Reply {
        if self.transactions.is_empty() {
            return Reply::bad_sequence();
        }

        let stamp = self.received_header();
        for transaction in &mut self.transactions {
            transaction.append_line(&stamp);
        }

        self.state = SessionState::ReceivingBody;
        Reply::new(
            ReplyCode::START_DATA,
            "Start mail input; end with <CRLF>.<CRLF>",
        )
    }

    fn handle_rset(&mut self) -> Reply {
        self.discard_transactions();
        self.sender = None;
        if self.state != SessionState::AwaitingGreeting {
            self.state = SessionState::AwaitingSender;
        }
        Reply::ok()
    }

    fn handle_quit(&mut self) -> Reply {
        self.discard_transactions();
        Reply::new(
            ReplyCode::CLOSING,
            format!("{} Service closing transmission channel", self.hostname),
        )
    }

    fn discard_transactions(&mut self) {
        for transaction in self.transactions.drain(..) {
            transaction.abort();
        }
    }

    /// Trace stamp recording which session accepted the message.
    fn received_header(&self) -> String {
        format!(
            "Received: from {} by {} for {}; {}",
            self.helo.as_deref().unwrap_or("unknown"),
            self.hostname,
            self.sender.as_deref().unwrap_or("<>"),
            chrono::Utc::now().to_rfc2822(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::types::Address;
    use std::sync::Mutex;
    use std::sync::mpsc;

    /// Delivery stub routing a single domain, recording outcomes.
    struct StubDelivery {
        domain: &'static str,
        committed: Mutex<mpsc::Sender<Vec<String>>>,
        aborted: Mutex<mpsc::Sender<usize>>,
    }

    struct StubTransaction {
        lines: Vec<String>,
        committed: mpsc::Sender<Vec<String>>,
        aborted: mpsc::Sender<usize>,
    }

    impl Transaction for StubTransaction {
        fn append_line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }

        fn commit(self: Box<Self>) {
            let _ = self.committed.send(self.lines);
        }

        fn abort(self: Box<Self>) {
            let _ = self.aborted.send(self.lines.len());
        }
    }

    impl MessageDelivery for StubDelivery {
        fn validate_recipient(&self, recipient: &Address) -> Result<Box<dyn Transaction>> {
            if recipient.domain() == self.domain {
                Ok(Box::new(StubTransaction {
                    lines: Vec::new(),
                    committed: self.committed.lock().unwrap().clone(),
                    aborted: self.aborted.lock().unwrap().clone(),
                }))
            } else {
                Err(Error::UnknownRecipient(recipient.as_str().to_string()))
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn session() -> (Session, mpsc::Receiver<Vec<String>>, mpsc::Receiver<usize>) {
        let (committed_tx, committed_rx) = mpsc::channel();
        let (aborted_tx, aborted_rx) = mpsc::channel();
        let delivery = StubDelivery {
            domain: "hooks.test",
            committed: Mutex::new(committed_tx),
            aborted: Mutex::new(aborted_tx),
        };
        (
            Session::new("mailhook.test", Arc::new(delivery)),
            committed_rx,
            aborted_rx,
        )
    }

    #[test]
    fn test_greeting_banner() {
        let (session, _, _) = session();
        let reply = session.greeting();
        assert_eq!(reply.code, ReplyCode::SERVICE_READY);
        assert!(reply.message.contains("mailhook.test"));
    }

    #[test]
    fn test_full_message_lifecycle() {
        let (mut session, committed, _) = session();

        assert_eq!(session.handle_command("HELO client.local").code, ReplyCode::OK);
        assert_eq!(session.state(), SessionState::AwaitingSender);

        assert_eq!(
            session.handle_command("MAIL FROM:<a@b.com>").code,
            ReplyCode::OK
        );
        assert_eq!(session.state(), SessionState::AwaitingRecipient);

        assert_eq!(
            session.handle_command("RCPT TO:<user@hooks.test>").code,
            ReplyCode::OK
        );

        assert_eq!(session.handle_command("DATA").code, ReplyCode::START_DATA);
        assert!(session.in_data_mode());

        assert!(session.handle_data_line("Subject: hi").is_none());
        assert!(session.handle_data_line("").is_none());
        assert!(session.handle_data_line("hello").is_none());

        let reply = session.handle_data_line(".").unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert_eq!(session.state(), SessionState::AwaitingSender);

        let lines = committed.try_recv().unwrap();
        // First line is the Received stamp, then the body verbatim
        assert!(lines[0].starts_with("Received: from client.local by mailhook.test"));
        assert_eq!(&lines[1..], &["Subject: hi", "", "hello"]);
    }

    #[test]
    fn test_unknown_recipient_rejected_session_continues() {
        let (mut session, _, _) = session();
        session.handle_command("HELO c");
        session.handle_command("MAIL FROM:<a@b.com>");

        let reply = session.handle_command("RCPT TO:<user@nomatch.org>");
        assert_eq!(reply.code, ReplyCode::MAILBOX_UNAVAILABLE);

        // A routable recipient is still accepted afterwards
        let reply = session.handle_command("RCPT TO:<user@hooks.test>");
        assert_eq!(reply.code, ReplyCode::OK);
    }

    #[test]
    fn test_bad_sequence() {
        let (mut session, _, _) = session();
        assert_eq!(
            session.handle_command("MAIL FROM:<a@b.com>").code,
            ReplyCode::BAD_SEQUENCE
        );
        session.handle_command("HELO c");
        assert_eq!(
            session.handle_command("RCPT TO:<u@hooks.test>").code,
            ReplyCode::BAD_SEQUENCE
        );
        assert_eq!(session.handle_command("DATA").code, ReplyCode::BAD_SEQUENCE);
    }

    #[test]
    fn test_rset_aborts_pending_transactions() {
        let (mut session, committed, aborted) = session();
        session.handle_command("HELO c");
        session.handle_command("MAIL FROM:<a@b.com>");
        session.handle_command("RCPT TO:<u@hooks.test>");

        assert_eq!(session.handle_command("RSET").code, ReplyCode::OK);
        assert_eq!(aborted.try_recv().unwrap(), 0);
        assert!(committed.try_recv().is_err());
        assert_eq!(session.state(), SessionState::AwaitingSender);
    }

    #[test]
    fn test_abort_discards_buffered_lines() {
        let (mut session, committed, aborted) = session();
        session.handle_command("HELO c");
        session.handle_command("MAIL FROM:<a@b.com>");
        session.handle_command("RCPT TO:<u@hooks.test>");
        session.handle_command("DATA");
        session.handle_data_line("half a message");

        session.abort();
        // Received stamp + one body line were buffered, none delivered
        assert_eq!(aborted.try_recv().unwrap(), 2);
        assert!(committed.try_recv().is_err());
    }

    #[test]
    fn test_multiple_recipients_fan_out() {
        let (mut session, committed, _) = session();
        session.handle_command("HELO c");
        session.handle_command("MAIL FROM:<a@b.com>");
        session.handle_command("RCPT TO:<one@hooks.test>");
        session.handle_command("RCPT TO:<two@hooks.test>");
        session.handle_command("DATA");
        session.handle_data_line("body");
        session.handle_data_line(".");

        let first = committed.try_recv().unwrap();
        let second = committed.try_recv().unwrap();
        assert_eq!(first.last().unwrap(), "body");
        assert_eq!(second.last().unwrap(), "body");
    }

    #[test]
    fn test_dot_unstuffing() {
        let (mut session, committed, _) = session();
        session.handle_command("HELO c");
        session.handle_command("MAIL FROM:<a@b.com>");
        session.handle_command("RCPT TO:<u@hooks.test>");
        session.handle_command("DATA");
        session.handle_data_line("..leading dot");
        session.handle_data_line(".");

        let lines = committed.try_recv().unwrap();
        assert_eq!(lines.last().unwrap(), ".leading dot");
    }

    #[test]
    fn test_second_message_on_same_session() {
        let (mut session, committed, _) = session();
        session.handle_command("HELO c");

        for body in ["first", "second"] {
            session.handle_command("MAIL FROM:<a@b.com>");
            session.handle_command("RCPT TO:<u@hooks.test>");
            session.handle_command("DATA");
            session.handle_data_line(body);
            session.handle_data_line(".");
        }

        assert_eq!(committed.try_recv().unwrap().last().unwrap(), "first");
        assert_eq!(committed.try_recv().unwrap().last().unwrap(), "second");
    }

    #[test]
    fn test_vrfy_not_implemented() {
        let (mut session, _, _) = session();
        assert_eq!(
            session.handle_command("VRFY user").code,
            ReplyCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn test_quit_closes() {
        let (mut session, _, _) = session();
        assert_eq!(session.handle_command("QUIT").code, ReplyCode::CLOSING);
    }

    #[test]
    fn test_unknown_command() {
        let (mut session, _, _) = session();
        assert_eq!(
            session.handle_command("EXPN list").code,
            ReplyCode::SYNTAX_ERROR
        );
    }
}
