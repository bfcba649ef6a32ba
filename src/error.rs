//! Centralized error types for mboxview.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxview library.
#[derive(Error, Debug)]
pub enum MboxError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// A message could not be split into envelope, headers and body.
    #[error("Parse error at offset {offset}: {reason}")]
    ParseError { offset: u64, reason: String },

    /// A MIME structure could not be resolved.
    #[error("MIME decoding error: {0}")]
    MimeError(String),

    /// The configuration file could not be parsed.
    #[error("Invalid config file '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    /// A request parameter could not be interpreted.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Convenience alias for `Result<T, MboxError>`.
pub type Result<T> = std::result::Result<T, MboxError>;

impl MboxError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for errors caused by a single malformed message, which the
    /// listing skips instead of failing the whole request.
    pub fn is_per_message(&self) -> bool {
        matches!(self, Self::ParseError { .. } | Self::MimeError(_))
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (prefer `MboxError::io`).
impl From<std::io::Error> for MboxError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_message_classification() {
        assert!(MboxError::MimeError("x".into()).is_per_message());
        assert!(MboxError::ParseError {
            offset: 0,
            reason: "x".into()
        }
        .is_per_message());
        assert!(!MboxError::InvalidQuery("page".into()).is_per_message());
        assert!(!MboxError::FileNotFound(PathBuf::from("a.mbox")).is_per_message());
        assert!(!MboxError::Config {
            path: PathBuf::from("config.toml"),
            reason: "x".into()
        }
        .is_per_message());
    }

    #[test]
    fn test_display_messages() {
        let err = MboxError::FileNotFound(PathBuf::from("emails.mbox"));
        assert_eq!(err.to_string(), "MBOX file not found: emails.mbox");
        let err = MboxError::InvalidQuery("page must be an integer".into());
        assert_eq!(err.to_string(), "Invalid query: page must be an integer");
    }
}
