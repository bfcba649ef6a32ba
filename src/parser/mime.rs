//! MIME body structure: a tagged tree of simple and multipart bodies, and
//! its flattening back to text for display.

use tracing::debug;

use crate::error::{MboxError, Result};
use crate::model::mail::Header;
use crate::parser::header::{
    content_type, get_header, header_param, is_header_line, parse_header_section,
};

/// Maximum depth for recursive multipart parsing (to prevent stack overflow on adversarial input).
pub const MAX_DEPTH: usize = 10;

/// A message or part body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Non-multipart content, kept exactly as stored (no transfer decoding).
    Simple(String),
    /// A `multipart/*` body split on its boundary.
    Multipart(Multipart),
}

/// The pieces of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    pub boundary: String,
    /// Text before the first delimiter line, if there was any.
    pub preamble: Option<String>,
    pub parts: Vec<Part>,
    /// Text after the closing delimiter line, if there was any.
    pub epilogue: Option<String>,
}

/// One sub-part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// A structured part with its own headers.
    Entity(MimeEntity),
    /// A section that does not start with a header block. Rendered as a
    /// part with an empty header block.
    Text(String),
}

/// Headers plus body, the unit a structured part is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeEntity {
    pub headers: Vec<Header>,
    pub body: Body,
}

/// Resolve a message body into a [`Body`] tree according to its headers.
///
/// Nesting deeper than [`MAX_DEPTH`] is a [`MboxError::MimeError`]. A
/// multipart `Content-Type` without a `boundary` parameter, or with a
/// boundary that never occurs in the body, leaves the body as
/// [`Body::Simple`].
pub fn parse_body(headers: &[Header], body: &str) -> Result<Body> {
    parse_body_at(headers, body, 0)
}

fn parse_body_at(headers: &[Header], body: &str, depth: usize) -> Result<Body> {
    if !content_type(headers).starts_with("multipart/") {
        return Ok(Body::Simple(body.to_string()));
    }

    let raw_type = get_header(headers, "content-type").unwrap_or_default();
    let Some(boundary) = header_param(&raw_type, "boundary").filter(|b| !b.is_empty()) else {
        debug!(content_type = %raw_type, "Multipart body without boundary, kept as text");
        return Ok(Body::Simple(body.to_string()));
    };

    if depth >= MAX_DEPTH {
        return Err(MboxError::MimeError(format!(
            "multipart nesting exceeds {MAX_DEPTH} levels"
        )));
    }

    let Some(sections) = split_multipart(body, &boundary) else {
        return Ok(Body::Simple(body.to_string()));
    };

    let parts = sections
        .parts
        .iter()
        .map(|section| parse_part(section, depth + 1))
        .collect::<Result<Vec<_>>>()?;

    Ok(Body::Multipart(Multipart {
        boundary,
        preamble: sections.preamble.map(str::to_string),
        parts,
        epilogue: sections.epilogue.map(str::to_string),
    }))
}

fn parse_part(section: &str, depth: usize) -> Result<Part> {
    let first_line = section.lines().next().unwrap_or("");
    if !first_line.is_empty() && !is_header_line(first_line) {
        return Ok(Part::Text(section.to_string()));
    }
    let (headers, body) = parse_header_section(section);
    let body = parse_body_at(&headers, body, depth)?;
    Ok(Part::Entity(MimeEntity { headers, body }))
}

struct Sections<'a> {
    preamble: Option<&'a str>,
    parts: Vec<&'a str>,
    epilogue: Option<&'a str>,
}

/// Split a multipart body on `--boundary` lines.
///
/// The line break in front of a delimiter line belongs to the delimiter.
/// Returns `None` when no delimiter occurs at all. A missing closing
/// delimiter ends the last part at end of input.
fn split_multipart<'a>(body: &'a str, boundary: &str) -> Option<Sections<'a>> {
    let delimiter = format!("--{boundary}");
    let mut preamble = None;
    let mut parts = Vec::new();
    let mut current: Option<usize> = None;
    let mut pos = 0;

    while pos < body.len() {
        let line_end = body[pos..]
            .find('\n')
            .map(|i| pos + i + 1)
            .unwrap_or(body.len());
        let line = body[pos..line_end].trim_end();

        if let Some(after) = line.strip_prefix(delimiter.as_str()) {
            let closing = after == "--";
            if after.is_empty() || closing {
                match current {
                    Some(start) => parts.push(strip_last_newline(&body[start..pos])),
                    None if pos > 0 => preamble = Some(strip_last_newline(&body[..pos])),
                    None => {}
                }
                if closing {
                    let rest = &body[line_end..];
                    return Some(Sections {
                        preamble,
                        parts,
                        epilogue: (!rest.is_empty()).then_some(rest),
                    });
                }
                current = Some(line_end);
            }
        }

        pos = line_end;
    }

    let start = current?;
    parts.push(strip_last_newline(&body[start..]));
    Some(Sections {
        preamble,
        parts,
        epilogue: None,
    })
}

fn strip_last_newline(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}

impl Body {
    /// Text shown as the message body.
    ///
    /// A simple body is returned as-is; a multipart body is the rendering of
    /// each sub-part joined with `\n`.
    pub fn flatten(&self) -> String {
        match self {
            Body::Simple(text) => text.clone(),
            Body::Multipart(multipart) => multipart
                .parts
                .iter()
                .map(Part::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Body::Simple(text) => out.push_str(text),
            Body::Multipart(multipart) => multipart.write_to(out),
        }
    }
}

impl Multipart {
    fn write_to(&self, out: &mut String) {
        if let Some(preamble) = &self.preamble {
            out.push_str(preamble);
            out.push('\n');
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str("--");
            out.push_str(&self.boundary);
            out.push('\n');
            out.push_str(&part.render());
        }
        out.push_str("\n--");
        out.push_str(&self.boundary);
        out.push_str("--");
        if let Some(epilogue) = &self.epilogue {
            out.push('\n');
            out.push_str(epilogue);
        }
    }
}

impl Part {
    /// Full textual form: headers, blank line and content. A section
    /// without headers still gets the blank line in front.
    pub fn render(&self) -> String {
        match self {
            Part::Entity(entity) => entity.render(),
            Part::Text(text) => format!("\n{text}"),
        }
    }
}

impl MimeEntity {
    /// Headers (with their original folding), a blank line, then the body.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for header in &self.headers {
            out.push_str(&header.name);
            out.push_str(": ");
            out.push_str(&header.value);
            out.push('\n');
        }
        out.push('\n');
        self.body.write_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message: &str) -> Result<Body> {
        let (headers, body) = parse_header_section(message);
        parse_body(&headers, body)
    }

    #[test]
    fn test_simple_body_kept_verbatim() {
        let body = parse("Subject: Hi\n\nLine one\n=E9 stays encoded\n").unwrap();
        assert_eq!(body, Body::Simple("Line one\n=E9 stays encoded\n".to_string()));
        assert_eq!(body.flatten(), "Line one\n=E9 stays encoded\n");
    }

    #[test]
    fn test_multipart_parts_joined_with_newline() {
        let msg = "Content-Type: multipart/alternative; boundary=\"XYZ\"\n\
                   \n\
                   This is a preamble\n\
                   --XYZ\n\
                   Content-Type: text/plain\n\
                   \n\
                   Plain part\n\
                   --XYZ\n\
                   Content-Type: text/html\n\
                   \n\
                   <p>HTML part</p>\n\
                   --XYZ--\n";
        let body = parse(msg).unwrap();
        let Body::Multipart(ref multipart) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(multipart.parts.len(), 2);
        assert_eq!(multipart.preamble.as_deref(), Some("This is a preamble"));
        assert_eq!(
            body.flatten(),
            "Content-Type: text/plain\n\nPlain part\nContent-Type: text/html\n\n<p>HTML part</p>"
        );
    }

    #[test]
    fn test_nested_multipart_renders_boundaries() {
        let msg = "Content-Type: multipart/mixed; boundary=outer\n\
                   \n\
                   --outer\n\
                   Content-Type: multipart/alternative; boundary=inner\n\
                   \n\
                   --inner\n\
                   Content-Type: text/plain\n\
                   \n\
                   Inner text\n\
                   --inner--\n\
                   --outer\n\
                   Content-Type: text/plain\n\
                   \n\
                   Second\n\
                   --outer--\n";
        let body = parse(msg).unwrap();
        assert_eq!(
            body.flatten(),
            "Content-Type: multipart/alternative; boundary=inner\n\n\
             --inner\nContent-Type: text/plain\n\nInner text\n--inner--\n\
             Content-Type: text/plain\n\nSecond"
        );
    }

    #[test]
    fn test_part_without_headers_is_text() {
        let msg = "Content-Type: multipart/mixed; boundary=b\n\n--b\njust words\n--b--\n";
        let Body::Multipart(multipart) = parse(msg).unwrap() else {
            panic!("expected multipart body");
        };
        assert_eq!(multipart.parts, vec![Part::Text("just words".to_string())]);
        assert_eq!(Body::Multipart(multipart).flatten(), "\njust words");
    }

    #[test]
    fn test_part_with_empty_header_block() {
        let msg = "Content-Type: multipart/mixed; boundary=b\n\n--b\n\nno headers\n--b--\n";
        let body = parse(msg).unwrap();
        assert_eq!(body.flatten(), "\nno headers");
    }

    #[test]
    fn test_folded_part_header_kept() {
        let msg = "Content-Type: multipart/mixed; boundary=b\n\n--b\nX-Long: one\n two\n\nx\n--b--\n";
        let body = parse(msg).unwrap();
        assert_eq!(body.flatten(), "X-Long: one\n two\n\nx");
    }

    #[test]
    fn test_missing_closing_boundary() {
        let msg = "Content-Type: multipart/mixed; boundary=b\n\n--b\nContent-Type: text/plain\n\nunterminated\n";
        let body = parse(msg).unwrap();
        assert_eq!(body.flatten(), "Content-Type: text/plain\n\nunterminated");
    }

    #[test]
    fn test_boundary_never_found_is_simple() {
        let msg = "Content-Type: multipart/mixed; boundary=nope\n\nplain text\n";
        assert_eq!(parse(msg).unwrap(), Body::Simple("plain text\n".to_string()));
    }

    #[test]
    fn test_multipart_without_boundary_is_simple() {
        let body = parse("Content-Type: multipart/mixed\n\n--x\n\nbody\n--x--\n").unwrap();
        assert_eq!(body, Body::Simple("--x\n\nbody\n--x--\n".to_string()));
    }

    #[test]
    fn test_nested_multipart_without_boundary_is_simple() {
        let msg = "Content-Type: multipart/mixed; boundary=outer\n\n\
                   --outer\n\
                   Content-Type: multipart/related\n\
                   \n\
                   loose text\n\
                   --outer--\n";
        let body = parse(msg).unwrap();
        assert_eq!(body.flatten(), "Content-Type: multipart/related\n\nloose text");
    }

    #[test]
    fn test_nested_text_section_keeps_blank_line() {
        let msg = "Content-Type: multipart/mixed; boundary=outer\n\n\
                   --outer\n\
                   Content-Type: multipart/alternative; boundary=inner\n\
                   \n\
                   --inner\n\
                   bare words\n\
                   --inner--\n\
                   --outer--\n";
        let body = parse(msg).unwrap();
        assert_eq!(
            body.flatten(),
            "Content-Type: multipart/alternative; boundary=inner\n\n\
             --inner\n\nbare words\n--inner--"
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut msg = String::new();
        for level in 0..=MAX_DEPTH {
            msg.push_str(&format!(
                "Content-Type: multipart/mixed; boundary=b{level}\n\n--b{level}\n"
            ));
        }
        msg.push_str("Content-Type: text/plain\n\ndeep\n");
        let err = parse(&msg).unwrap_err();
        assert!(matches!(err, MboxError::MimeError(_)));
    }
}
