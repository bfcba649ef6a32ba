//! Split one RFC 5322 message (optionally with its MBOX `From ` line) into a [`RawMessage`].

use crate::model::mail::RawMessage;
use crate::parser::header::{decode_message_bytes, parse_header_section};

/// Build a [`RawMessage`] from the raw bytes of a single message.
///
/// Never fails: undecodable bytes fall back to Windows-1252, and a message
/// without a header block simply has no headers. Structural problems in the
/// body are reported later, when the body is resolved.
pub fn parse_raw_message(data: &[u8], offset: u64, sequence: u64) -> RawMessage {
    let text = decode_message_bytes(data);
    let (envelope, rest) = split_envelope(&text);
    let (headers, body) = parse_header_section(rest);

    RawMessage {
        sequence,
        offset,
        envelope: envelope.to_string(),
        headers,
        body: body.to_string(),
    }
}

/// Separate the leading `From ` line (if any) from the message text.
fn split_envelope(text: &str) -> (&str, &str) {
    if !text.starts_with("From ") {
        return ("", text);
    }
    match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    }
}
