//! RFC 5322 header parsing: header sections, folding, encoded-words (RFC 2047), and dates.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use tracing::debug;

use crate::model::mail::Header;

/// Decode raw message bytes to text.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
/// A leading BOM is dropped and CRLF line endings are normalized to LF.
pub fn decode_message_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    };

    if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text
    }
}

/// Split a header section off the front of `text`.
///
/// Returns the header fields in order and the remainder after the blank line
/// that ends the section. A line that is neither a field nor a continuation
/// also ends the section; it is kept as the first line of the remainder.
pub fn parse_header_section(text: &str) -> (Vec<Header>, &str) {
    let mut headers: Vec<Header> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };

        if line.is_empty() {
            return (headers, next);
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            match headers.last_mut() {
                Some(last) => {
                    last.value.push('\n');
                    last.value.push_str(line);
                }
                None => break,
            }
        } else if let Some((name, value)) = split_field(line) {
            headers.push(Header {
                name: name.to_string(),
                value: value.to_string(),
            });
        } else {
            break;
        }

        rest = next;
    }

    (headers, rest)
}

/// `true` if the line has the shape `Name: value`.
pub fn is_header_line(line: &str) -> bool {
    split_field(line).is_some()
}

fn split_field(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    if name.is_empty() || !name.bytes().all(|b| (33..=126).contains(&b)) {
        return None;
    }
    Some((name, line[colon + 1..].trim_start()))
}

/// Get the first value for a header name (case-insensitive), unfolded.
pub fn get_header(headers: &[Header], name: &str) -> Option<String> {
    headers.iter().find(|h| h.is(name)).map(Header::unfolded)
}

/// The lowercase `type/subtype` of a header list, `text/plain` when absent.
pub fn content_type(headers: &[Header]) -> String {
    get_header(headers, "content-type")
        .and_then(|ct| ct.split(';').next().map(|m| m.trim().to_lowercase()))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "text/plain".to_string())
}

/// Look up a `key=value` parameter of a structured header value
/// (e.g. `boundary` in `Content-Type`). Quotes are removed.
pub fn header_param(value: &str, key: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        if !k.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        let v = v.trim();
        let v = v
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(v);
        Some(v.to_string())
    })
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
///
/// Values without encoded-words are returned unchanged. Decoding is delegated
/// to `mail-parser` by wrapping the value in a one-line message.
pub fn decode_encoded_words(input: &str) -> String {
    if !input.contains("=?") {
        return input.to_string();
    }

    let wrapped = format!("Subject: {input}\n\n");
    mail_parser::MessageParser::default()
        .parse(wrapped.as_bytes())
        .and_then(|msg| msg.subject().map(str::to_string))
        .unwrap_or_else(|| input.to_string())
}

/// Parse an email date string and convert it to local wall-clock time.
///
/// Supports RFC 2822 with numeric or named zones, an optional day-of-week,
/// IMAP-style `DD-MON-YYYY`, and ISO 8601. A date without any zone is taken
/// as local time.
pub fn parse_date(date_str: &str) -> Option<DateTime<Local>> {
    let trimmed = strip_comment(date_str.trim());
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Local));
    }

    let no_dow = strip_day_of_week(trimmed);
    let normalized = normalize_imap_date(no_dow);

    const ZONED: [&str; 5] = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M %z",
        "%b %d %H:%M:%S %Y %z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%z",
    ];
    const NAIVE: [&str; 5] = [
        "%d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M",
        "%b %d %H:%M:%S %Y",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];

    for candidate in [normalized.clone(), replace_named_tz(&normalized)] {
        for fmt in ZONED {
            if let Ok(dt) = DateTime::parse_from_str(&candidate, fmt) {
                return Some(dt.with_timezone(&Local));
            }
        }
    }

    for fmt in NAIVE {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            if let Some(dt) = Local.from_local_datetime(&ndt).earliest() {
                return Some(dt);
            }
        }
    }

    if let Some(dt) = mail_parser_date(trimmed) {
        return Some(dt);
    }

    debug!(date = trimmed, "Could not parse date");
    None
}

/// Last resort: let `mail-parser` interpret the value.
fn mail_parser_date(input: &str) -> Option<DateTime<Local>> {
    let wrapped = format!("Date: {input}\n\n");
    let parsed = mail_parser::MessageParser::default().parse(wrapped.as_bytes())?;
    let timestamp = parsed.date()?.to_timestamp();
    Local.timestamp_opt(timestamp, 0).single()
}

/// Drop a trailing `(comment)`, e.g. `"-0800 (PST)"` → `"-0800"`.
fn strip_comment(s: &str) -> &str {
    if s.ends_with(')') {
        if let Some(open) = s.rfind('(') {
            return s[..open].trim_end();
        }
    }
    s
}

/// Strip a leading day-of-week prefix (e.g. `"Thu, "` or `"Thu "`).
fn strip_day_of_week(s: &str) -> &str {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    for day in DAYS {
        if let Some(rest) = s.strip_prefix(day) {
            let rest = rest.strip_prefix(',').unwrap_or(rest);
            if rest.starts_with(' ') {
                return rest.trim_start();
            }
        }
    }
    s
}

/// Normalize IMAP-style dates: `"16-JUL-2025 03:01:03"` → `"16 Jul 2025 03:01:03"`.
fn normalize_imap_date(s: &str) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let Some((day, rest)) = s.split_once('-') else {
        return s.to_string();
    };
    if day.is_empty() || !day.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }
    let Some((month, tail)) = rest.split_once('-') else {
        return s.to_string();
    };
    match MONTHS.iter().find(|m| m.eq_ignore_ascii_case(month)) {
        Some(m) => format!("{day} {m} {tail}"),
        None => s.to_string(),
    }
}

/// Replace a trailing timezone abbreviation with its numeric offset.
fn replace_named_tz(s: &str) -> String {
    const ZONES: [(&str, &str); 15] = [
        ("UT", "+0000"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("Z", "+0000"),
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("CET", "+0100"),
        ("CEST", "+0200"),
        ("JST", "+0900"),
    ];
    if let Some((head, last)) = s.rsplit_once(' ') {
        if let Some((_, offset)) = ZONES.iter().find(|(name, _)| name.eq_ignore_ascii_case(last)) {
            return format!("{head} {offset}");
        }
    }
    s.to_string()
}
