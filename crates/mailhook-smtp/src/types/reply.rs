//! SMTP reply types.

/// SMTP reply sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply message.
    pub message: String,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    pub fn new(code: ReplyCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for `250 Ok`.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(ReplyCode::OK, "Ok")
    }

    /// Shorthand for `500 Syntax error`.
    #[must_use]
    pub fn syntax_error() -> Self {
        Self::new(ReplyCode::SYNTAX_ERROR, "Syntax error")
    }

    /// Shorthand for `503 Bad sequence of commands`.
    #[must_use]
    pub fn bad_sequence() -> Self {
        Self::new(ReplyCode::BAD_SEQUENCE, "Bad sequence of commands")
    }

    /// Formats the reply as protocol wire lines.
    ///
    /// Multi-line messages use `-` continuation separators per RFC 5321
    /// section 4.2.1.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut lines = self.message.split('\n').peekable();
        let mut out = String::new();

        while let Some(line) = lines.next() {
            let sep = if lines.peek().is_none() { ' ' } else { '-' };
            out.push_str(&format!("{}{}{}\r\n", self.code, sep, line));
        }

        out
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Common reply codes
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 451 Local error in processing
    pub const LOCAL_ERROR: Self = Self(451);
    /// 500 Syntax error, command unrecognized
    pub const SYNTAX_ERROR: Self = Self(500);
    /// 501 Syntax error in parameters or arguments
    pub const PARAMETER_ERROR: Self = Self(501);
    /// 502 Command not implemented
    pub const NOT_IMPLEMENTED: Self = Self(502);
    /// 503 Bad sequence of commands
    pub const BAD_SEQUENCE: Self = Self(503);
    /// 550 Mailbox unavailable (not found, access denied)
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_to_wire_single_line() {
        let reply = Reply::new(ReplyCode::OK, "Ok");
        assert_eq!(reply.to_wire(), "250 Ok\r\n");
    }

    #[test]
    fn test_reply_to_wire_multiline() {
        let reply = Reply::new(ReplyCode::OK, "First\nSecond\nLast");
        assert_eq!(reply.to_wire(), "250-First\r\n250-Second\r\n250 Last\r\n");
    }

    #[test]
    fn test_reply_code_classes() {
        assert!(ReplyCode::OK.is_success());
        assert!(ReplyCode::LOCAL_ERROR.is_transient());
        assert!(ReplyCode::MAILBOX_UNAVAILABLE.is_permanent());
        assert!(!ReplyCode::START_DATA.is_success());
    }

    #[test]
    fn test_reply_display() {
        let reply = Reply::bad_sequence();
        assert_eq!(reply.to_string(), "503 Bad sequence of commands");
    }
}
