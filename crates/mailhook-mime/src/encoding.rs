//! MIME transfer decoding.
//!
//! The gateway only ever decodes inbound payloads, so this module
//! carries the decode half of Base64 and Quoted-Printable (RFC 2045).

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 data.
///
/// Whitespace is stripped before decoding since encoded mail bodies are
/// line-wrapped.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Output is raw bytes; quoted-printable can carry any octet.
///
/// # Errors
///
/// Returns an error if the input contains an invalid escape sequence.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut bytes = text.bytes().peekable();

    while let Some(b) = bytes.next() {
        if b == b'=' {
            // Soft line break
            if bytes.peek() == Some(&b'\r') {
                bytes.next();
                if bytes.peek() == Some(&b'\n') {
                    bytes.next();
                }
                continue;
            }
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
                continue;
            }

            // Hex encoded byte
            let hi = bytes.next();
            let lo = bytes.next();
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    let hex = [hi, lo];
                    let hex = std::str::from_utf8(&hex)
                        .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
                    let byte = u8::from_str_radix(hex, 16)
                        .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
                    result.push(byte);
                }
                _ => {
                    return Err(Error::InvalidEncoding(
                        "Incomplete escape sequence".to_string(),
                    ));
                }
            }
        } else {
            result.push(b);
        }
    }

    Ok(result)
}
