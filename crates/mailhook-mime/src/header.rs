//! Mail header handling.

use std::collections::HashMap;

/// Collection of mail headers.
///
/// Lookup is case-insensitive. Values are kept verbatim; no RFC 2047
/// decoding is applied.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    /// Parses headers from raw text.
    ///
    /// Headers are in the format:
    /// ```text
    /// Header-Name: value
    ///  continuation line
    /// ```
    ///
    /// Lines that fit neither shape are skipped; header parsing never
    /// fails.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current_name: Option<String> = None;
        let mut current_value = String::new();

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }

            // Continuation line (starts with space or tab)
            if line.starts_with(' ') || line.starts_with('\t') {
                if current_name.is_some() {
                    current_value.push(' ');
                    current_value.push_str(line.trim());
                }
                continue;
            }

            // Save previous header if exists
            if let Some(name) = current_name.take() {
                headers.add(name, current_value.trim().to_string());
                current_value.clear();
            }

            if let Some((name, value)) = line.split_once(':') {
                current_name = Some(name.trim().to_string());
                current_value = value.trim().to_string();
            }
        }

        if let Some(name) = current_name {
            headers.add(name, current_value.trim().to_string());
        }

        headers
    }
}

/// Extracts a `key=value` parameter from a structured header value such
/// as `Content-Disposition: attachment; filename="report.txt"`.
///
/// Quotes around the value are stripped. Returns `None` when the
/// parameter is absent.
#[must_use]
pub fn parameter(value: &str, key: &str) -> Option<String> {
    for param in value.split(';').skip(1) {
        if let Some((name, val)) = param.split_once('=') {
            if name.trim().eq_ignore_ascii_case(key) {
                return Some(val.trim().trim_matches('"').to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain")); // Case insensitive
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n"
        );

        let headers = Headers::parse(text);
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_headers_parse_skips_junk() {
        let headers = Headers::parse("garbage without a colon\nSubject: ok\n");
        assert_eq!(headers.get("Subject"), Some("ok"));
    }

    #[test]
    fn test_headers_contains() {
        let mut headers = Headers::new();
        headers.add("Content-Disposition", "attachment");
        assert!(headers.contains("content-disposition"));
        assert!(!headers.contains("content-type"));
    }

    #[test]
    fn test_parameter() {
        assert_eq!(
            parameter("attachment; filename=\"report.txt\"", "filename").as_deref(),
            Some("report.txt")
        );
        assert_eq!(
            parameter("attachment; filename=report.txt", "FILENAME").as_deref(),
            Some("report.txt")
        );
        assert_eq!(parameter("attachment", "filename"), None);
    }
}
