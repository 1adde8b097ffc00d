//! `multipart/form-data` encoding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;

use crate::record::Attachment;

/// An encoded form body together with its Content-Type value.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    /// Full Content-Type header value, boundary parameter included.
    pub content_type: String,
    /// The encoded body.
    pub body: Vec<u8>,
}

impl EncodedForm {
    /// Body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true if the body is empty. Never the case for encoder
    /// output, which always carries at least the closing delimiter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Encodes fields and attachments as a `multipart/form-data` body.
///
/// Plain fields come first, in slice order, then one part per
/// attachment. Lines are joined with CRLF and the body ends with the
/// closing delimiter followed by a final CRLF.
#[must_use]
pub fn encode(fields: &[(&str, &str)], attachments: &[Attachment]) -> EncodedForm {
    let boundary = make_boundary();
    let mut lines: Vec<Vec<u8>> = Vec::new();

    for (name, value) in fields {
        lines.push(format!("--{boundary}").into_bytes());
        lines.push(format!("Content-Disposition: form-data; name=\"{name}\"").into_bytes());
        lines.push(Vec::new());
        lines.push(value.as_bytes().to_vec());
    }

    for attachment in attachments {
        lines.push(format!("--{boundary}").into_bytes());
        lines.push(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                attachment.field, attachment.filename
            )
            .into_bytes(),
        );
        lines.push(format!("Content-Type: {}", guess_content_type(&attachment.filename)).into_bytes());
        lines.push(Vec::new());
        lines.push(attachment.data.clone());
    }

    lines.push(format!("--{boundary}--").into_bytes());
    lines.push(Vec::new());

    EncodedForm {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body: lines.join(&b"\r\n"[..]),
    }
}

/// 18 random bytes, URL-safe base64 without padding. The alphabet
/// contains no CR, LF, or quote, so the boundary never needs quoting.
fn make_boundary() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..18).map(|_| rng.r#gen::<u8>()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Maps a filename extension to a Content-Type for the attachment
/// part. Unrecognized extensions fall back to application/octet-stream.
fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt" | "log") => "text/plain",
        Some("htm" | "html") => "text/html",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gif") => "image/gif",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
