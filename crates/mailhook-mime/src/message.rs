//! MIME document structure and parsing.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_quoted_printable};
use crate::header::{Headers, parameter};

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

/// Body of a MIME part.
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw payload of a leaf part, still transfer-encoded.
    Leaf(Vec<u8>),
    /// Child parts of a `multipart/*` container.
    Multipart(Vec<Part>),
}

/// One part of a MIME document.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body.
    pub body: Body,
}

impl Part {
    /// Gets the content type, defaulting to `text/plain` when the
    /// header is missing or unparseable.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(ContentType::text_plain)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Returns the declared filename, if any.
    ///
    /// The `Content-Disposition` `filename` parameter wins; the
    /// `Content-Type` `name` parameter is the fallback.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.headers
            .get("content-disposition")
            .and_then(|v| parameter(v, "filename"))
            .or_else(|| self.content_type().name().map(ToString::to_string))
    }

    /// Returns true if the part carries a `Content-Disposition` header.
    #[must_use]
    pub fn has_disposition(&self) -> bool {
        self.headers.contains("content-disposition")
    }

    /// Returns true if this is a `multipart/*` container.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, Body::Multipart(_))
    }

    /// Decodes the leaf payload according to the transfer encoding.
    ///
    /// Containers yield an empty payload. Decode failures fall back to
    /// the raw bytes; a bad payload never fails the document.
    #[must_use]
    pub fn decode_body(&self) -> Vec<u8> {
        let Body::Leaf(raw) = &self.body else {
            return Vec::new();
        };

        match self.transfer_encoding() {
            TransferEncoding::Base64 => {
                decode_base64(&String::from_utf8_lossy(raw)).unwrap_or_else(|_| raw.clone())
            }
            TransferEncoding::QuotedPrintable => decode_quoted_printable(&String::from_utf8_lossy(raw))
                .unwrap_or_else(|_| raw.clone()),
            _ => raw.clone(),
        }
    }

    /// Decoded payload as text (lossy for non-UTF-8 bytes).
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.decode_body()).into_owned()
    }

    /// Depth-first traversal of the leaf parts of this subtree.
    ///
    /// A non-multipart part yields itself; containers yield only their
    /// descendants, never themselves.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        match &self.body {
            Body::Leaf(_) => vec![self],
            Body::Multipart(children) => children.iter().flat_map(Self::leaves).collect(),
        }
    }
}

/// A parsed mail document: a part tree rooted at the message itself.
#[derive(Debug, Clone)]
pub struct Document {
    /// Root part; its headers are the message's top-level headers.
    pub root: Part,
}

impl Document {
    /// Parses a raw mail document.
    ///
    /// Parsing is infallible: unrecognized structure degrades to a
    /// single leaf part with whatever headers could be read.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            root: parse_part(raw),
        }
    }

    /// Gets the To header verbatim.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.root.headers.get("to")
    }

    /// Gets the From header verbatim.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.root.headers.get("from")
    }

    /// Gets the Subject header verbatim.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.root.headers.get("subject")
    }
}

/// Parses one part: header block, then a leaf payload or, for
/// multipart content types with a boundary, recursively parsed
/// children.
fn parse_part(raw: &str) -> Part {
    let (header_text, body_text) = split_document(raw);
    let headers = Headers::parse(header_text);

    let content_type = headers
        .get("content-type")
        .and_then(|v| ContentType::parse(v).ok());

    let body = match content_type.as_ref().and_then(ContentType::boundary) {
        Some(boundary) if content_type.as_ref().is_some_and(ContentType::is_multipart) => {
            let children = split_multipart(body_text, boundary)
                .into_iter()
                .map(parse_part)
                .collect();
            Body::Multipart(children)
        }
        _ => Body::Leaf(body_text.as_bytes().to_vec()),
    };

    Part { headers, body }
}

/// Splits a document into its header block and body.
///
/// The split point is the first blank line. A line that is neither a
/// header nor a continuation ends the header block early, with that
/// line belonging to the body (lenient handling of headerless input).
fn split_document(raw: &str) -> (&str, &str) {
    let mut pos = 0;
    for line in raw.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        if content.is_empty() {
            return (&raw[..pos], &raw[pos + line.len()..]);
        }
        let continuation = line.starts_with(' ') || line.starts_with('\t');
        if !continuation && !content.contains(':') {
            return (&raw[..pos], &raw[pos..]);
        }
        pos += line.len();
    }
    (raw, "")
}

/// Splits a multipart body into its sub-documents.
///
/// Sections between `--boundary` delimiter lines are returned verbatim
/// minus the line terminator that precedes the next delimiter. The
/// preamble (before the first delimiter) and epilogue (after the
/// closing `--boundary--`) are discarded.
fn split_multipart<'a>(body: &'a str, boundary: &str) -> Vec<&'a str> {
    let delimiter = format!("--{boundary}");
    let closing = format!("--{boundary}--");

    let mut sections = Vec::new();
    let mut section_start: Option<usize> = None;
    let mut pos = 0;

    for line in body.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        if content == closing {
            if let Some(start) = section_start.take() {
                sections.push(trim_trailing_newline(&body[start..pos]));
            }
            break;
        }
        if content == delimiter {
            if let Some(start) = section_start {
                sections.push(trim_trailing_newline(&body[start..pos]));
            }
            section_start = Some(pos + line.len());
        }
        pos += line.len();
    }

    // No closing delimiter seen; keep the dangling section
    if let Some(start) = section_start {
        if start < body.len() {
            sections.push(trim_trailing_newline(&body[start..]));
        }
    }

    sections
}

/// Strips the single line terminator owned by the following boundary.
fn trim_trailing_newline(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}
