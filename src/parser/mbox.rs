//! Streaming MBOX parser.
//!
//! Reads MBOX files line-by-line through a large buffer and yields one
//! message at a time. Never loads the entire file into memory. Tolerant of
//! malformed input.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{MboxError, Result};

/// Size of the internal read buffer (1 MB for fast sequential reads on modern SSDs).
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Default maximum message size in bytes (256 MB).
pub const MAX_MESSAGE_SIZE: usize = 256 * 1024 * 1024;

/// Raw bytes of one message, starting with its `From ` separator line.
#[derive(Debug, Clone)]
pub struct MboxEntry {
    /// Byte offset of the separator line inside the file.
    pub offset: u64,
    pub data: Vec<u8>,
}

/// Streaming MBOX parser.
///
/// Splits the file on `From ` separator lines. The parser is tolerant of:
///
/// - Mixed `\n` and `\r\n` line endings
/// - `From ` lines not preceded by a blank line (logs a warning)
/// - Truncated messages at EOF
/// - NUL bytes and other binary content in the body
/// - UTF-8 BOM at the start of the file
///
/// Lines before the first separator do not belong to any message and are
/// skipped. The blank line in front of a separator (or at EOF) is not part
/// of the preceding message.
#[derive(Debug, Clone)]
pub struct MboxParser {
    path: PathBuf,
    read_buffer_size: usize,
    max_message_size: usize,
}

impl MboxParser {
    /// Create a parser for the given MBOX file.
    ///
    /// Verifies that the file exists, but does NOT validate that it is
    /// actually an MBOX.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MboxError::FileNotFound(path.clone())
            } else {
                MboxError::io(&path, e)
            }
        })?;
        Ok(Self {
            path,
            read_buffer_size: READ_BUFFER_SIZE,
            max_message_size: MAX_MESSAGE_SIZE,
        })
    }

    /// Override the read buffer and per-message size limits.
    pub fn with_limits(mut self, read_buffer_size: usize, max_message_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(4096);
        self.max_message_size = max_message_size;
        self
    }

    /// Path to the MBOX file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and iterate over its messages in file order.
    ///
    /// Each call opens the file again, so the iteration reflects the file's
    /// contents at that moment.
    pub fn messages(&self) -> Result<Messages> {
        let file = File::open(&self.path).map_err(|e| MboxError::io(&self.path, e))?;
        Ok(Messages {
            path: self.path.clone(),
            reader: BufReader::with_capacity(self.read_buffer_size, file),
            max_message_size: self.max_message_size,
            offset: 0,
            pending: None,
            prev_line_was_empty: true,
            last_line_was_blank: false,
            seen_separator: false,
            skipped_leading: false,
            done: false,
            line_buf: Vec::with_capacity(4096),
        })
    }
}

/// Iterator over the messages of an MBOX file.
///
/// Yields `Err` once and then stops if the underlying read fails.
pub struct Messages {
    path: PathBuf,
    reader: BufReader<File>,
    max_message_size: usize,
    offset: u64,
    /// Separator line that opened the next message, with its offset.
    pending: Option<(u64, Vec<u8>)>,
    prev_line_was_empty: bool,
    last_line_was_blank: bool,
    seen_separator: bool,
    skipped_leading: bool,
    done: bool,
    line_buf: Vec<u8>,
}

impl Messages {
    /// Read the next line (with its terminator) into `line_buf`.
    /// Returns `false` at EOF.
    fn read_line(&mut self) -> Result<bool> {
        self.line_buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.line_buf)
            .map_err(|e| MboxError::io(&self.path, e))?;
        Ok(n > 0)
    }

    fn finish(&mut self, offset: u64, mut data: Vec<u8>) -> MboxEntry {
        if self.last_line_was_blank {
            if data.ends_with(b"\r\n") {
                data.truncate(data.len() - 2);
            } else if data.ends_with(b"\n") {
                data.truncate(data.len() - 1);
            }
        }
        MboxEntry { offset, data }
    }
}

impl Iterator for Messages {
    type Item = Result<MboxEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let (mut start, mut buf) = match self.pending.take() {
            Some((offset, line)) => (offset, line),
            None => (self.offset, Vec::new()),
        };
        let mut truncated = false;
        self.last_line_was_blank = false;

        loop {
            match self.read_line() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            let line_offset = self.offset;
            self.offset += self.line_buf.len() as u64;

            if is_mbox_separator(&self.line_buf, line_offset == 0) {
                if self.seen_separator && !self.prev_line_was_empty {
                    warn!(
                        offset = line_offset,
                        "Found 'From ' separator without preceding blank line"
                    );
                }
                self.seen_separator = true;
                self.prev_line_was_empty = false;

                if buf.is_empty() {
                    start = line_offset;
                    buf.extend_from_slice(&self.line_buf);
                    self.last_line_was_blank = false;
                    continue;
                }

                self.pending = Some((line_offset, self.line_buf.clone()));
                return Some(Ok(self.finish(start, buf)));
            }

            let blank = is_blank_line(&self.line_buf);
            self.prev_line_was_empty = blank;

            if !self.seen_separator {
                if !self.skipped_leading && !blank {
                    warn!(
                        offset = line_offset,
                        "Skipping content before the first 'From ' separator"
                    );
                    self.skipped_leading = true;
                }
                continue;
            }

            if buf.len() + self.line_buf.len() <= self.max_message_size {
                buf.extend_from_slice(&self.line_buf);
                self.last_line_was_blank = matches!(self.line_buf.as_slice(), b"\n" | b"\r\n");
            } else if !truncated {
                warn!(
                    offset = start,
                    max_size = self.max_message_size,
                    "Message exceeds maximum size, truncating body"
                );
                truncated = true;
            }
        }

        if buf.is_empty() {
            None
        } else {
            Some(Ok(self.finish(start, buf)))
        }
    }
}

/// Check whether a line is an MBOX separator (`From ` at the start).
/// A UTF-8 BOM is only allowed on the very first line of the file.
fn is_mbox_separator(line: &[u8], at_file_start: bool) -> bool {
    let line = if at_file_start {
        line.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(line)
    } else {
        line
    };
    line.starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}
