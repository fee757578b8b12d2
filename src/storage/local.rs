//! Local filesystem storage implementation.
//!
//! Rule paths are resolved against the storage root; absolute rule paths are
//! used as they are.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{MatchRecord, MatchStorage, WriteMetadata};
use crate::utils::sanitize_file_component;

/// Attempts at finding a free content file name before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a rule-relative path.
    fn path(&self, relative: &Path) -> PathBuf {
        self.root_dir.join(relative)
    }

    /// Deterministic content file name from timestamp and paste key.
    pub fn content_file_name(timestamp: &str, key: &str, attempt: usize) -> String {
        let stem = format!(
            "{}_{}",
            sanitize_file_component(timestamp),
            sanitize_file_component(key)
        );
        if attempt == 0 {
            format!("{stem}.txt")
        } else {
            format!("{stem}-{attempt}.txt")
        }
    }

    async fn append_log_line(&self, path: &Path, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Create the content file without overwriting an existing one.
    async fn write_new_file(&self, dir: &Path, record: &MatchRecord<'_>) -> Result<PathBuf> {
        let timestamp = record.timestamp();
        let contents = format!("{}\n", record.text);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(Self::content_file_name(&timestamp, record.key, attempt));
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(AppError::Persist { path, source }),
            };

            let written = async {
                file.write_all(contents.as_bytes()).await?;
                file.flush().await
            }
            .await;

            return match written {
                Ok(()) => Ok(path),
                Err(source) => Err(AppError::Persist { path, source }),
            };
        }

        Err(AppError::Persist {
            path: dir.to_path_buf(),
            source: std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
        })
    }
}

#[async_trait]
impl MatchStorage for LocalStorage {
    async fn write_match(&self, record: &MatchRecord<'_>) -> Result<WriteMetadata> {
        let log_file = self.path(&record.rule.log_file);
        let line = format!("{} - {}\n", record.timestamp(), record.url);
        self.append_log_line(&log_file, &line)
            .await
            .map_err(|source| AppError::MatchLog {
                path: log_file.clone(),
                source,
            })?;

        let output_dir = self.path(&record.rule.output_dir);
        if let Err(e) = fs::create_dir_all(&output_dir).await {
            log::debug!("create_dir_all {:?} failed: {}", output_dir, e);
        }

        let content_file = self.write_new_file(&output_dir, record).await?;
        log::debug!("Saved paste {} to {:?}", record.key, content_file);

        Ok(WriteMetadata {
            log_file,
            content_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rule;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn record<'a>(rule: &'a Rule, key: &'a str, text: &'a str) -> MatchRecord<'a> {
        MatchRecord {
            key,
            url: "https://scrape.pastebin.com/api_scrape_item.php?i=abc123",
            text,
            rule,
            found_at: Local.with_ymd_and_hms(2026, 10, 17, 8, 30, 5).unwrap(),
        }
    }

    #[test]
    fn test_content_file_name() {
        assert_eq!(
            LocalStorage::content_file_name("2026/10/17 08:30:05", "abc123", 0),
            "2026_10_17__08_30_05_abc123.txt"
        );
        assert_eq!(
            LocalStorage::content_file_name("2026/10/17 08:30:05", "a/b", 2),
            "2026_10_17__08_30_05_a_b-2.txt"
        );
    }

    #[tokio::test]
    async fn test_write_match_creates_log_and_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let rule = Rule::new("^SECRET", "match.log", "matches/").unwrap();

        let meta = storage
            .write_match(&record(&rule, "abc123", "SECRET DATA HERE"))
            .await
            .unwrap();

        let log = std::fs::read_to_string(tmp.path().join("match.log")).unwrap();
        assert_eq!(
            log,
            "2026/10/17 08:30:05 - https://scrape.pastebin.com/api_scrape_item.php?i=abc123\n"
        );
        assert_eq!(
            meta.content_file,
            tmp.path().join("matches/2026_10_17__08_30_05_abc123.txt")
        );
        let saved = std::fs::read_to_string(&meta.content_file).unwrap();
        assert_eq!(saved, "SECRET DATA HERE\n");
    }

    #[tokio::test]
    async fn test_log_is_appended() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let rule = Rule::new("x", "match.log", "matches").unwrap();

        storage.write_match(&record(&rule, "one", "x1")).await.unwrap();
        storage.write_match(&record(&rule, "two", "x2")).await.unwrap();

        let log = std::fs::read_to_string(tmp.path().join("match.log")).unwrap();
        assert_eq!(log.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_same_timestamp_and_key_does_not_overwrite() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let rule = Rule::new("x", "match.log", "matches").unwrap();

        let first = storage.write_match(&record(&rule, "k", "first")).await.unwrap();
        let second = storage.write_match(&record(&rule, "k", "second")).await.unwrap();

        assert_ne!(first.content_file, second.content_file);
        assert_eq!(
            std::fs::read_to_string(&first.content_file).unwrap(),
            "first\n"
        );
        assert_eq!(
            std::fs::read_to_string(&second.content_file).unwrap(),
            "second\n"
        );
    }

    #[tokio::test]
    async fn test_existing_output_dir_is_fine() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("matches")).unwrap();
        let storage = LocalStorage::new(tmp.path());
        let rule = Rule::new("x", "match.log", "matches").unwrap();

        assert!(storage.write_match(&record(&rule, "k", "x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_unwritable_output_is_fatal() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the output directory should be.
        std::fs::write(tmp.path().join("blocked"), b"").unwrap();
        let storage = LocalStorage::new(tmp.path());
        let rule = Rule::new("x", "match.log", "blocked").unwrap();

        let err = storage
            .write_match(&record(&rule, "k", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persist { .. }));
        assert!(err.is_fatal());
    }
}
