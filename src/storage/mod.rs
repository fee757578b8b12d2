//! Storage abstractions for matched pastes.
//!
//! A match is recorded twice:
//!
//! ```text
//! {root}/
//! ├── match.log                                  # "<timestamp> - <url>" per match
//! └── matches/
//!     └── 2026_10_17__08_30_05_abc123.txt        # raw extracted text
//! ```
//!
//! Both locations come from the matching rule.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;
use crate::models::Rule;

// Re-export for convenience
pub use local::LocalStorage;

/// Timestamp format used in match logs and file names.
pub const MATCH_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A paste that matched a rule.
#[derive(Debug, Clone, Copy)]
pub struct MatchRecord<'a> {
    pub key: &'a str,
    pub url: &'a str,
    pub text: &'a str,
    pub rule: &'a Rule,
    pub found_at: DateTime<Local>,
}

impl MatchRecord<'_> {
    pub fn timestamp(&self) -> String {
        self.found_at.format(MATCH_TIMESTAMP_FORMAT).to_string()
    }
}

/// Where a match ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMetadata {
    pub log_file: PathBuf,
    pub content_file: PathBuf,
}

/// Trait for match storage backends.
#[async_trait]
pub trait MatchStorage: Send + Sync {
    /// Append the match to the rule's log and save its text in the rule's
    /// output directory.
    async fn write_match(&self, record: &MatchRecord<'_>) -> Result<WriteMetadata>;
}
