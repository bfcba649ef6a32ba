//! Raw archive messages and the records exposed over the API.

/// A single header field as it appears in the message.
///
/// `value` keeps the original folding (continuation lines joined with `\n`
/// and their leading whitespace intact) so the field can be written back out
/// unchanged. Use [`Header::unfolded`] for lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Field name with its original casing.
    pub name: String,
    /// Raw field value, leading whitespace after the colon removed.
    pub value: String,
}

impl Header {
    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// The value with continuation lines joined by single spaces.
    pub fn unfolded(&self) -> String {
        if !self.value.contains('\n') {
            return self.value.trim().to_string();
        }
        self.value
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One message as read from the archive, before any field extraction.
///
/// Created fresh for every scan and dropped once the request is answered.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Absolute 0-based position of the message in the archive.
    pub sequence: u64,

    /// Byte offset of the `From ` separator line inside the MBOX file.
    pub offset: u64,

    /// The `From ` envelope line without its line ending.
    pub envelope: String,

    /// Header fields in file order. Names may repeat.
    pub headers: Vec<Header>,

    /// Everything after the blank line that ends the header block.
    pub body: String,
}

impl RawMessage {
    /// First value of a header (case-insensitive), unfolded.
    pub fn header(&self, name: &str) -> Option<String> {
        crate::parser::header::get_header(&self.headers, name)
    }
}

/// Normalized projection of a [`RawMessage`], serialized as-is to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmailRecord {
    /// Archive position, or position among filtered results depending on
    /// the listing id mode.
    pub id: u64,
    /// Decoded subject, `"(No subject)"` when absent.
    pub subject: String,
    /// Sender header value, empty when absent.
    pub from: String,
    /// Local time as `YYYY-MM-DD HH:MM:SS`, empty when missing or unparseable.
    pub date: String,
    /// Message body; multipart bodies are flattened to text.
    pub body: String,
}
