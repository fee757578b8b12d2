// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod paste;
mod rule;

// Re-export all public types
pub use config::{Config, CrawlerConfig, LoggingConfig, MatchMode, PollConfig};
pub use paste::{BatchResponse, FetchStatus, PasteRef};
pub use rule::{Rule, RuleSet};
