// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rule pattern failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rule file missing, unreadable or malformed
    #[error("Rule file error at line {line}: {message}")]
    RuleFile { line: usize, message: String },

    /// Writing a matched paste failed
    #[error("Cannot write match to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Appending to a rule's log file failed
    #[error("Cannot append to log file {}: {source}", path.display())]
    MatchLog {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Text extraction from a paste body failed
    #[error("Extraction error: {0}")]
    Extract(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a rule file error for a given line (1-based, 0 for the whole file).
    pub fn rule_file(line: usize, message: impl fmt::Display) -> Self {
        Self::RuleFile {
            line,
            message: message.to_string(),
        }
    }

    /// Create an extraction error.
    pub fn extract(message: impl fmt::Display) -> Self {
        Self::Extract(message.to_string())
    }

    /// Whether this error must stop the process.
    ///
    /// Network and extraction failures are recoverable; a broken rule set,
    /// broken configuration or a match that cannot be written are not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RuleFile { .. } | Self::Config(_) | Self::Validation(_) | Self::Persist { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::rule_file(3, "bad").is_fatal());
        assert!(AppError::config("missing").is_fatal());
        assert!(
            AppError::Persist {
                path: PathBuf::from("out/x.txt"),
                source: std::io::Error::other("disk full"),
            }
            .is_fatal()
        );

        assert!(!AppError::extract("garbled").is_fatal());
        assert!(
            !AppError::MatchLog {
                path: PathBuf::from("match.log"),
                source: std::io::Error::other("denied"),
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_rule_file_message() {
        let err = AppError::rule_file(7, "expected 3 fields, found 2");
        assert_eq!(
            err.to_string(),
            "Rule file error at line 7: expected 3 fields, found 2"
        );
    }
}
