//! Field extraction: turn a [`RawMessage`] into the values shown to clients.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::model::mail::{EmailRecord, RawMessage};
use crate::parser::header::{decode_encoded_words, parse_date};
use crate::parser::mime;

/// Placeholder used when a message has no `Subject:` header.
pub const NO_SUBJECT: &str = "(No subject)";

/// Output format of [`EmailRecord::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header-derived fields, cheap to compute and enough to evaluate filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub subject: String,
    pub from: String,
    /// Local wall-clock time, `None` when the header is missing or unparseable.
    pub date: Option<NaiveDateTime>,
}

impl HeaderFields {
    /// Read subject, sender and date from the first occurrence of each header.
    ///
    /// The subject has its RFC 2047 encoded words decoded; the sender is the
    /// header value as written, only unfolded.
    pub fn from_message(message: &RawMessage) -> Self {
        let subject = message
            .header("subject")
            .map(|s| decode_encoded_words(&s))
            .unwrap_or_else(|| NO_SUBJECT.to_string());

        let from = message.header("from").unwrap_or_default();

        let date = message
            .header("date")
            .and_then(|d| parse_date(&d))
            .map(|dt| dt.naive_local());

        Self {
            subject,
            from,
            date,
        }
    }
}

/// Everything needed to build an [`EmailRecord`] except its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub fields: HeaderFields,
    pub body: String,
}

impl Extracted {
    /// Attach the id chosen by the caller and format the date.
    pub fn into_record(self, id: u64) -> EmailRecord {
        EmailRecord {
            id,
            subject: self.fields.subject,
            from: self.fields.from,
            date: self
                .fields
                .date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            body: self.body,
        }
    }
}

/// Resolve the body of a message into display text.
///
/// Fails with a MIME error when multipart nesting is too deep.
pub fn render_body(message: &RawMessage) -> Result<String> {
    let body = mime::parse_body(&message.headers, &message.body)?;
    Ok(body.flatten())
}

/// Extract all fields of a message.
pub fn extract(message: &RawMessage) -> Result<Extracted> {
    let fields = HeaderFields::from_message(message);
    let body = render_body(message)?;
    Ok(Extracted { fields, body })
}
