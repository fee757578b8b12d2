//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the rule file
    #[serde(default = "defaults::rules_file")]
    pub rules_file: PathBuf,

    /// HTTP client and endpoint settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Polling cadence and backoff settings
    #[serde(default)]
    pub polling: PollConfig,

    /// Console output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| AppError::config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Load configuration, or return the defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.crawler.scraping_url).map_err(|e| {
            AppError::validation(format!("crawler.scraping_url is not a URL: {e}"))
        })?;
        url::Url::parse(&self.crawler.item_url)
            .map_err(|e| AppError::validation(format!("crawler.item_url is not a URL: {e}")))?;

        if self.polling.limit == 0 {
            return Err(AppError::validation("polling.limit must be > 0"));
        }
        if self.polling.flush_after == 0 {
            return Err(AppError::validation("polling.flush_after must be > 0"));
        }
        if !is_valid_secs(self.polling.delay_secs) {
            return Err(AppError::validation(
                "polling.delay_secs must be a non-negative, representable number of seconds",
            ));
        }
        if !is_valid_secs(self.polling.connection_timeout_secs) {
            return Err(AppError::validation(
                "polling.connection_timeout_secs must be a non-negative, representable number of seconds",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_file: defaults::rules_file(),
            crawler: CrawlerConfig::default(),
            polling: PollConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn is_valid_secs(secs: f64) -> bool {
    secs >= 0.0 && Duration::try_from_secs_f64(secs).is_ok()
}

/// Float seconds as a `Duration`; negative and NaN values count as zero,
/// values too large to represent as `Duration::MAX`.
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// HTTP client and endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Recent-pastes listing endpoint
    #[serde(default = "defaults::scraping_url")]
    pub scraping_url: String,

    /// Raw paste endpoint; the paste key is appended to it
    #[serde(default = "defaults::item_url")]
    pub item_url: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            scraping_url: defaults::scraping_url(),
            item_url: defaults::item_url(),
        }
    }
}

/// How a rule pattern is tested against paste text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The match must start at the beginning of the text
    #[default]
    Prefix,
    /// The match may start anywhere in the text
    Anywhere,
}

/// Polling cadence and backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Target seconds between two batch fetches
    #[serde(default = "defaults::refresh")]
    pub refresh_secs: u64,

    /// Pause after each paste fetch, in seconds
    #[serde(default = "defaults::delay")]
    pub delay_secs: f64,

    /// Minutes to wait after an access denial
    #[serde(default = "defaults::ban_wait")]
    pub ban_wait_minutes: u64,

    /// Batch items processed before the dedup cache is flushed
    #[serde(default = "defaults::flush_after")]
    pub flush_after: usize,

    /// Seconds to wait after a connection failure
    #[serde(default = "defaults::connection_timeout")]
    pub connection_timeout_secs: f64,

    /// Maximum pastes requested per batch
    #[serde(default = "defaults::limit")]
    pub limit: usize,

    #[serde(default)]
    pub match_mode: MatchMode,
}

impl PollConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn delay(&self) -> Duration {
        secs_to_duration(self.delay_secs)
    }

    pub fn connection_wait(&self) -> Duration {
        secs_to_duration(self.connection_timeout_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            refresh_secs: defaults::refresh(),
            delay_secs: defaults::delay(),
            ban_wait_minutes: defaults::ban_wait(),
            flush_after: defaults::flush_after(),
            connection_timeout_secs: defaults::connection_timeout(),
            limit: defaults::limit(),
            match_mode: MatchMode::default(),
        }
    }
}

/// Console output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Colour console output when it is a terminal
    #[serde(default = "defaults::color")]
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            color: defaults::color(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn rules_file() -> PathBuf {
        PathBuf::from("regexes.txt")
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pastewatch/0.1)".into()
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn scraping_url() -> String {
        "https://scrape.pastebin.com/api_scraping.php".into()
    }

    pub fn item_url() -> String {
        "https://scrape.pastebin.com/api_scrape_item.php?i=".into()
    }

    // Polling defaults
    pub fn refresh() -> u64 {
        30
    }

    pub fn delay() -> f64 {
        1.0
    }

    pub fn ban_wait() -> u64 {
        5
    }

    pub fn flush_after() -> usize {
        100
    }

    pub fn connection_timeout() -> f64 {
        60.0
    }

    pub fn limit() -> usize {
        50
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn color() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rules_file, PathBuf::from("regexes.txt"));
        assert_eq!(config.polling.refresh_secs, 30);
        assert_eq!(config.polling.delay(), Duration::from_secs(1));
        assert_eq!(config.polling.ban_wait_minutes, 5);
        assert_eq!(config.polling.flush_after, 100);
        assert_eq!(config.polling.connection_wait(), Duration::from_secs(60));
        assert_eq!(config.polling.limit, 50);
        assert_eq!(config.polling.match_mode, MatchMode::Prefix);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            rules_file = "rules/watch.txt"

            [polling]
            refresh_secs = 60
            match_mode = "anywhere"
            "#,
        )
        .unwrap();

        assert_eq!(config.rules_file, PathBuf::from("rules/watch.txt"));
        assert_eq!(config.polling.refresh_secs, 60);
        assert_eq!(config.polling.match_mode, MatchMode::Anywhere);
        assert_eq!(config.polling.limit, 50);
        assert_eq!(config.crawler.timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.polling.flush_after = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.polling.limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.polling.delay_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_waits() {
        let mut config = Config::default();
        config.polling.delay_secs = 1e300;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
        assert_eq!(config.polling.delay(), Duration::MAX);

        let mut config = Config::default();
        config.polling.connection_timeout_secs = f64::INFINITY;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
        assert_eq!(config.polling.connection_wait(), Duration::MAX);

        let mut config = Config::default();
        config.polling.delay_secs = f64::NAN;
        assert!(config.validate().is_err());
        assert_eq!(config.polling.delay(), Duration::ZERO);
    }

    #[test]
    fn test_validate_accepts_zero_refresh() {
        let mut config = Config::default();
        config.polling.refresh_secs = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.refresh_interval(), Duration::ZERO);
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.crawler.scraping_url = "not a url".into();
        assert!(matches!(
            config.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(tmp.path().join("pastewatch.toml")).unwrap();
        assert_eq!(config.polling.limit, 50);
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pastewatch.toml");
        fs::write(&path, "[polling]\nlimit = \"many\"\n").unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
