//! Flattening a mail document into form fields and attachments.

use mailhook_mime::Document;

/// Form field name under which every attachment is posted.
pub const ATTACHMENT_FIELD: &str = "attachment";

/// One extracted attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field name (always [`ATTACHMENT_FIELD`]).
    pub field: String,
    /// Declared or synthesized filename.
    pub filename: String,
    /// Transfer-decoded payload.
    pub data: Vec<u8>,
}

/// Flat record extracted from one mail document.
///
/// `to`, `from`, `subject`, and `body` are always present (empty when
/// the source lacks them); `body_html` only when an HTML part exists.
/// Header values are verbatim; encoded words are not decoded.
#[derive(Debug, Clone, Default)]
pub struct MailRecord {
    /// To header, verbatim.
    pub to: String,
    /// From header, verbatim.
    pub from: String,
    /// Subject header, verbatim.
    pub subject: String,
    /// First text/plain part without a filename.
    pub body: String,
    /// First text/html part without a filename, if any.
    pub body_html: Option<String>,
    /// Attachment parts in document order.
    pub attachments: Vec<Attachment>,
}

impl MailRecord {
    /// Extracts a record from raw mail text. Never fails; missing
    /// pieces degrade to empty values.
    ///
    /// Leaf classification, in order:
    /// - first `text/plain` part without a filename becomes `body`;
    /// - first `text/html` part without a filename becomes `body_html`;
    /// - parts without a `Content-Disposition` header are skipped;
    /// - everything else is an attachment.
    #[must_use]
    pub fn extract(raw: &str) -> Self {
        let document = Document::parse(raw);

        let mut body: Option<String> = None;
        let mut body_html: Option<String> = None;
        let mut attachments = Vec::new();

        for part in document.root.leaves() {
            let content_type = part.content_type();
            let filename = part.filename();

            if content_type.is("text", "plain") && filename.is_none() && body.is_none() {
                body = Some(part.body_text());
            } else if content_type.is("text", "html") && filename.is_none() && body_html.is_none() {
                body_html = Some(part.body_text());
            } else {
                if !part.has_disposition() {
                    continue;
                }

                // The counter starts at 1 for every unnamed part, so
                // all unnamed attachments in one message share the
                // same synthesized name.
                let counter = 1;
                let filename = filename.unwrap_or_else(|| format!("part-{counter:03}{}", "bin"));

                attachments.push(Attachment {
                    field: ATTACHMENT_FIELD.to_string(),
                    filename,
                    data: part.decode_body(),
                });
            }
        }

        Self {
            to: document.to().unwrap_or_default().to_string(),
            from: document.from().unwrap_or_default().to_string(),
            subject: document.subject().unwrap_or_default().to_string(),
            body: body.unwrap_or_default(),
            body_html,
            attachments,
        }
    }

    /// Field name/value pairs in posting order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = vec![
            ("to", self.to.as_str()),
            ("from", self.from.as_str()),
            ("subject", self.subject.as_str()),
            ("body", self.body.as_str()),
        ];
        if let Some(html) = &self.body_html {
            fields.push(("body_html", html.as_str()));
        }
        fields
    }
}
