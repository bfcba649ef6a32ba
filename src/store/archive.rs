//! Archive handle: a read-only MBOX file that is re-scanned for every query.

use std::path::Path;

use tracing::debug;

use crate::config::PerformanceConfig;
use crate::error::{MboxError, Result};
use crate::model::mail::RawMessage;
use crate::parser::eml;
use crate::parser::mbox::{MboxParser, Messages};

/// The MBOX archive behind the server.
///
/// Holds only the path and read limits, so it is cheap to clone and safe to
/// share between requests. Nothing is cached: every [`Archive::scan`] reads
/// the file as it is at that moment. Ids are only stable while the file is
/// left untouched.
#[derive(Debug, Clone)]
pub struct Archive {
    parser: MboxParser,
}

impl Archive {
    /// Open an archive, failing with [`MboxError::FileNotFound`] if it is absent.
    pub fn open(path: impl AsRef<Path>, performance: &PerformanceConfig) -> Result<Self> {
        let parser = MboxParser::new(path)?
            .with_limits(performance.read_buffer_size, performance.max_message_size);
        Ok(Self { parser })
    }

    /// Path to the MBOX file.
    pub fn path(&self) -> &Path {
        self.parser.path()
    }

    /// Current size of the file in bytes.
    pub fn file_size(&self) -> Result<u64> {
        std::fs::metadata(self.path())
            .map(|m| m.len())
            .map_err(|e| MboxError::io(self.path(), e))
    }

    /// Start a fresh, independent pass over every message in archive order.
    pub fn scan(&self) -> Result<Scan> {
        debug!(path = %self.path().display(), "Scanning archive");
        Ok(Scan {
            messages: self.parser.messages()?,
            sequence: 0,
        })
    }
}

/// One pass over the archive, yielding messages with their absolute position.
pub struct Scan {
    messages: Messages,
    sequence: u64,
}

impl Iterator for Scan {
    type Item = Result<RawMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.messages.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        let message = eml::parse_raw_message(&entry.data, entry.offset, self.sequence);
        self.sequence += 1;
        Some(Ok(message))
    }
}
