//! Inbound SMTP command parsing.

use crate::error::{Error, Result};
use crate::types::Address;

/// A parsed inbound SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HELO <domain>`
    Helo(String),
    /// `EHLO <domain>` (treated like HELO; no extensions advertised)
    Ehlo(String),
    /// `MAIL FROM:<reverse-path>` — the raw path, possibly empty for
    /// bounce messages.
    MailFrom(String),
    /// `RCPT TO:<forward-path>`
    RcptTo(Address),
    /// `DATA`
    Data,
    /// `RSET`
    Rset,
    /// `NOOP`
    Noop,
    /// `QUIT`
    Quit,
    /// `VRFY <string>` — parsed but always answered 502.
    Vrfy(String),
}

impl Command {
    /// Parses one command line (terminator already stripped).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for unknown verbs and
    /// [`Error::InvalidAddress`] for malformed paths.
    pub fn parse(line: &str) -> Result<Self> {
        let (verb, param) = line
            .split_once(' ')
            .map_or((line, ""), |(v, p)| (v, p.trim()));

        match verb.to_ascii_uppercase().as_str() {
            "HELO" => Ok(Self::Helo(param.to_string())),
            "EHLO" => Ok(Self::Ehlo(param.to_string())),
            "MAIL" => {
                let path = angle_path(param, "FROM:")?;
                Ok(Self::MailFrom(path))
            }
            "RCPT" => {
                let path = angle_path(param, "TO:")?;
                Ok(Self::RcptTo(Address::new(path)?))
            }
            "DATA" => Ok(Self::Data),
            "RSET" => Ok(Self::Rset),
            "NOOP" => Ok(Self::Noop),
            "QUIT" => Ok(Self::Quit),
            "VRFY" => Ok(Self::Vrfy(param.to_string())),
            _ => Err(Error::Syntax(format!("Unrecognized command: {verb}"))),
        }
    }
}

/// Extracts the address from a `FROM:<path>` / `TO:<path>` argument.
///
/// The angle brackets are optional; some clients omit them. The path
/// itself may be empty (`MAIL FROM:<>`).
fn angle_path(param: &str, keyword: &str) -> Result<String> {
    let matches = param
        .get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword));
    if !matches {
        return Err(Error::Syntax(format!("Expected {keyword}<address>")));
    }

    let rest = param[keyword.len()..].trim();
    let path = match (rest.find('<'), rest.rfind('>')) {
        (Some(open), Some(close)) if open < close => &rest[open + 1..close],
        _ => rest,
    };

    Ok(path.trim().to_string())
}
