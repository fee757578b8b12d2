//! The polling loop.
//!
//! One cycle fetches a batch of recent paste keys, checks every key not seen
//! in earlier cycles, saves matches, updates the dedup cache and then waits
//! according to [`Backoff`]. Everything runs on a single task: pastes are
//! fetched one at a time with a fixed delay in between, and nothing is
//! fetched while a backoff wait is in progress.

use std::time::Duration;

use chrono::Local;
use tokio::time::{Instant, sleep};

use crate::error::Result;
use crate::models::{BatchResponse, FetchStatus, PasteRef, PollConfig};
use crate::pipeline::backoff::{BAN_STEP, Backoff};
use crate::pipeline::dedup::{CycleEnd, DedupCache};
use crate::services::{Classifier, PasteSource};
use crate::storage::{MatchRecord, MatchStorage};
use crate::utils::log::{self, Tone};

/// Running totals since startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    pub cycles: usize,
    pub pastes_seen: usize,
    pub pastes_read: usize,
    pub matches: usize,
    pub item_failures: usize,
    pub backoffs: usize,
    pub flushes: usize,
}

impl PollStats {
    /// Key/value pairs for the shutdown summary.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Refreshes", self.cycles.to_string()),
            ("Pastes listed", self.pastes_seen.to_string()),
            ("Pastes read", self.pastes_read.to_string()),
            ("Matches saved", self.matches.to_string()),
            ("Paste errors", self.item_failures.to_string()),
            ("Backoffs", self.backoffs.to_string()),
            ("Cache flushes", self.flushes.to_string()),
        ]
    }
}

/// Result of one batch fetch and its processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub status: FetchStatus,
    pub listed: usize,
    pub read: usize,
    pub matched: usize,
    pub elapsed: Duration,
    pub cache: Option<CycleEnd>,
}

impl CycleReport {
    fn failed(status: FetchStatus) -> Self {
        Self {
            status,
            listed: 0,
            read: 0,
            matched: 0,
            elapsed: Duration::ZERO,
            cache: None,
        }
    }
}

/// Drives the fetch/classify/persist cycle and its backoff.
pub struct PollController {
    source: Box<dyn PasteSource>,
    storage: Box<dyn MatchStorage>,
    classifier: Classifier,
    config: PollConfig,
    cache: DedupCache,
    stats: PollStats,
}

impl PollController {
    pub fn new(
        source: Box<dyn PasteSource>,
        storage: Box<dyn MatchStorage>,
        classifier: Classifier,
        config: PollConfig,
    ) -> Self {
        let cache = DedupCache::new(config.flush_after);
        Self {
            source,
            storage,
            classifier,
            config,
            cache,
            stats: PollStats::default(),
        }
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Poll forever. Returns only on a fatal error; see [`Self::run_until`]
    /// for a stoppable loop.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let report = self.run_cycle().await?;
            let backoff = Backoff::for_status(report.status, report.elapsed, &self.config);
            self.apply(backoff).await;
        }
    }

    /// Poll until `shutdown` resolves or a fatal error occurs.
    ///
    /// Shutdown drops the cycle in progress, including any sleep, and
    /// returns `Ok`. Stats gathered so far stay available.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run() => result,
            _ = shutdown => {
                log::debug("Shutdown requested, stopping the poll loop");
                Ok(())
            }
        }
    }

    /// Fetch one batch and process it.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        log::note(Tone::Purple, "Getting pastes");
        let response = self.source.fetch_batch(self.config.limit).await;

        match response {
            BatchResponse::Ok(pastes) => self.process_batch(pastes).await,
            BatchResponse::AccessDenied => {
                log::fatal(
                    "Your public IP is not whitelisted. Go to https://pastebin.com/doc_scraping_api",
                );
                Ok(CycleReport::failed(FetchStatus::AccessDenied))
            }
            BatchResponse::ConnectionFail(reason) => {
                log::error(&format!("Error getting pastes: {reason}"));
                Ok(CycleReport::failed(FetchStatus::ConnectionFail))
            }
            BatchResponse::OtherError(reason) => {
                log::error(&format!("Error getting pastes: {reason}"));
                Ok(CycleReport::failed(FetchStatus::OtherError))
            }
        }
    }

    async fn process_batch(&mut self, pastes: Vec<PasteRef>) -> Result<CycleReport> {
        let start = Instant::now();
        let delay = self.config.delay();
        log::note(Tone::Purple, &format!("Got {} pastes", pastes.len()));

        let mut read = 0;
        let mut matched = 0;
        for paste in &pastes {
            if self.cache.observe(&paste.key) {
                if self.check_paste(&paste.key).await? {
                    matched += 1;
                }
                read += 1;
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
        }

        let cache_end = self.cache.end_cycle();
        if cache_end == CycleEnd::Flushed {
            self.stats.flushes += 1;
            log::debug(&format!(
                "Flushed paste cache, {} keys kept",
                self.cache.known_len()
            ));
        }

        self.stats.cycles += 1;
        self.stats.pastes_seen += pastes.len();
        self.stats.pastes_read += read;
        self.stats.matches += matched;

        let elapsed = start.elapsed();
        log::note(Tone::Purple, &format!("Read {read} pastes"));
        log::note(
            Tone::Blue,
            &format!("Elapsed time: {:.3}s", elapsed.as_secs_f64()),
        );

        Ok(CycleReport {
            status: FetchStatus::Ok,
            listed: pastes.len(),
            read,
            matched,
            elapsed,
            cache: Some(cache_end),
        })
    }

    /// Fetch and classify one paste, saving it on a match.
    ///
    /// Fetch and extraction errors skip the paste. Only a match that cannot
    /// be saved is returned as an error.
    async fn check_paste(&mut self, key: &str) -> Result<bool> {
        log::note(Tone::Cyan, &format!("Checking paste {key}"));

        let text = match self.source.fetch_content(key).await {
            Ok(text) => text,
            Err(e) => {
                self.stats.item_failures += 1;
                log::error(&format!("Error on check paste {key}: {e}"));
                return Ok(false);
            }
        };

        let Some(rule) = self.classifier.classify(&text) else {
            return Ok(false);
        };

        let url = self.source.paste_url(key);
        log::note(
            Tone::Cyan,
            &format!(
                "Found a matching paste: {} ({})",
                url,
                rule.log_file.display()
            ),
        );

        let record = MatchRecord {
            key,
            url: &url,
            text: &text,
            rule,
            found_at: Local::now(),
        };
        match self.storage.write_match(&record).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.stats.item_failures += 1;
                log::error(&format!("Error on check paste {key}: {e}"));
                Ok(false)
            }
        }
    }

    /// Suspend the loop as the backoff requires.
    pub async fn apply(&mut self, backoff: Backoff) {
        match backoff {
            Backoff::Refresh(wait) => {
                if !wait.is_zero() {
                    log::note(
                        Tone::Blue,
                        &format!("Waiting {} seconds to refresh...", wait.as_secs()),
                    );
                    sleep(wait).await;
                }
            }
            Backoff::Banned { minutes } => {
                self.stats.backoffs += 1;
                log::warn("Damn! It looks like you have been banned (probably temporarily)");
                for remaining in (1..=minutes).rev() {
                    let plural = if remaining > 1 { "s" } else { "" };
                    log::info(&format!("Please wait {remaining} minute{plural}"));
                    sleep(BAN_STEP).await;
                }
            }
            Backoff::ConnectionDown(wait) => {
                self.stats.backoffs += 1;
                log::error(&format!(
                    "Connection down. Waiting {} seconds and trying again",
                    wait.as_secs_f64()
                ));
                sleep(wait).await;
            }
            Backoff::Retry(wait) => {
                self.stats.backoffs += 1;
                log::error("Unknown error. Maybe an encoding problem? Trying again.");
                sleep(wait).await;
            }
        }
    }
}
