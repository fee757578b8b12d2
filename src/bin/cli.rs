//! pastewatch CLI
//!
//! Polls the Pastebin scraping feed until interrupted.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pastewatch::{
    error::Result,
    models::{Config, MatchMode, RuleSet},
    pipeline::PollController,
    services::{Classifier, PastebinClient},
    storage::LocalStorage,
    utils::log as notify,
};

const DEFAULT_CONFIG: &str = "pastewatch.toml";

/// pastewatch - Pastebin feed watcher
#[derive(Parser, Debug)]
#[command(
    name = "pastewatch",
    version,
    about = "Watches the Pastebin scraping feed for pastes matching a rule set"
)]
struct Cli {
    /// Path to a TOML config file (default: ./pastewatch.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the rule file (default: regexes.txt)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Set the refresh time in seconds (default: 30)
    #[arg(short = 'r', long = "refresh-time", global = true)]
    refresh_time: Option<u64>,

    /// Set the delay between paste fetches in seconds (default: 1)
    #[arg(short = 'd', long = "delay-time", global = true)]
    delay: Option<f64>,

    /// Set the ban wait time in minutes (default: 5)
    #[arg(short = 'b', long = "ban-wait-time", global = true)]
    ban_wait: Option<u64>,

    /// Set the number of listed pastes after which memory is flushed (default: 100)
    #[arg(short = 'f', long = "flush-after-x-refreshes", global = true)]
    flush_after: Option<usize>,

    /// Set the wait after a connection failure in seconds (default: 60)
    #[arg(short = 'c', long = "connection-timeout", global = true)]
    connection_timeout: Option<f64>,

    /// Set the limit of results by fetch (default: 50)
    #[arg(short = 'l', long, global = true)]
    limit: Option<usize>,

    /// Match rule patterns anywhere in the paste instead of at its start
    #[arg(long, global = true)]
    match_anywhere: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the feed until interrupted (default)
    Watch,

    /// Check configuration and rule file, then exit
    Validate,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(DEFAULT_CONFIG)?,
        };

        if let Some(path) = &self.rules {
            config.rules_file = path.clone();
        }
        let polling = &mut config.polling;
        if let Some(v) = self.refresh_time {
            polling.refresh_secs = v;
        }
        if let Some(v) = self.delay {
            polling.delay_secs = v;
        }
        if let Some(v) = self.ban_wait {
            polling.ban_wait_minutes = v;
        }
        if let Some(v) = self.flush_after {
            polling.flush_after = v;
        }
        if let Some(v) = self.connection_timeout {
            polling.connection_timeout_secs = v;
        }
        if let Some(v) = self.limit {
            polling.limit = v;
        }
        if self.match_anywhere {
            polling.match_mode = MatchMode::Anywhere;
        }
        if self.no_color {
            config.logging.color = false;
        }
        if self.verbose {
            config.logging.level = "debug".into();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn watch(config: Config, rules: RuleSet) -> Result<()> {
    notify::header("pastewatch");
    notify::sub_item(&format!(
        "{} rules from {}",
        rules.len(),
        config.rules_file.display()
    ));
    notify::sub_item(&format!(
        "refresh {}s, delay {}s, limit {}, flush after {} pastes",
        config.polling.refresh_secs,
        config.polling.delay_secs,
        config.polling.limit,
        config.polling.flush_after
    ));

    let source = PastebinClient::new(&config.crawler)?;
    let classifier = Classifier::new(rules, config.polling.match_mode);
    let mut controller = PollController::new(
        Box::new(source),
        Box::new(LocalStorage::new(".")),
        classifier,
        config.polling.clone(),
    );

    let result = controller.run_until(shutdown_signal()).await;

    notify::summary("Session", &controller.stats().summary_items());
    if result.is_ok() {
        notify::info("Bye! Hope you found what you were looking for :)");
    }
    result
}

fn validate(config: &Config, rules: &RuleSet) {
    notify::info(&format!(
        "Config OK (feed: {}, limit {})",
        config.crawler.scraping_url, config.polling.limit
    ));
    notify::info(&format!(
        "{} rules loaded from {}",
        rules.len(),
        config.rules_file.display()
    ));
    for rule in rules {
        notify::sub_item(&rule.to_string());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    notify::init(&config.logging);

    let rules = RuleSet::load(&config.rules_file)?;
    if rules.is_empty() {
        notify::warn("Rule file has no rules; nothing will ever match");
    }

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(config, rules).await,
        Command::Validate => {
            validate(&config, &rules);
            Ok(())
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            notify::fatal(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
