// src/utils/log.rs

//! Operator-facing console notifications.
//!
//! Every line carries a timestamp and a level tag. When the target stream is
//! a terminal and colour is enabled, lines are bold and coloured by level.

use std::io::IsTerminal;
use std::sync::OnceLock;

use chrono::Local;

use crate::models::LoggingConfig;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Info,
        }
    }
}

/// Message colour, independent of level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Purple,
    Cyan,
    Blue,
    Yellow,
    Red,
}

impl Tone {
    fn ansi(&self) -> &'static str {
        match self {
            Tone::Plain => "",
            Tone::Purple => "\x1b[95m",
            Tone::Cyan => "\x1b[96m",
            Tone::Blue => "\x1b[94m",
            Tone::Yellow => "\x1b[93m",
            Tone::Red => "\x1b[91m",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    level: LogLevel,
    color: bool,
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Initialize the notifier from the logging configuration.
pub fn init(config: &LoggingConfig) {
    let _ = SETTINGS.set(Settings {
        level: LogLevel::from_str(&config.level),
        color: config.color && std::io::stdout().is_terminal(),
    });
}

fn settings() -> Settings {
    SETTINGS.get().copied().unwrap_or(Settings {
        level: LogLevel::Info,
        color: false,
    })
}

/// Check if a log level should be displayed
fn should_log(level: LogLevel) -> bool {
    level == LogLevel::Fatal || level >= settings().level
}

/// Format a log line with timestamp, level and optional colour.
fn format_log(level: LogLevel, tone: Tone, color: bool, message: &str) -> String {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    let line = format!("[{}] [{}] {}", timestamp, level.as_str(), message);
    if !color {
        return line;
    }

    let emphasis = if level >= LogLevel::Info { BOLD } else { "" };
    let tone = match level {
        LogLevel::Error | LogLevel::Fatal => Tone::Red,
        _ => tone,
    };
    format!("{}{}{}{}", emphasis, tone.ansi(), line, RESET)
}

fn emit(level: LogLevel, tone: Tone, message: &str) {
    if !should_log(level) {
        return;
    }
    let line = format_log(level, tone, settings().color, message);
    if level >= LogLevel::Warn {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Log a debug message
pub fn debug(message: &str) {
    emit(LogLevel::Debug, Tone::Plain, message);
}

/// Log an info message
pub fn info(message: &str) {
    emit(LogLevel::Info, Tone::Plain, message);
}

/// Log an info message in a given colour
pub fn note(tone: Tone, message: &str) {
    emit(LogLevel::Info, tone, message);
}

/// Log a warning message
pub fn warn(message: &str) {
    emit(LogLevel::Warn, Tone::Yellow, message);
}

/// Log an error message
pub fn error(message: &str) {
    emit(LogLevel::Error, Tone::Red, message);
}

/// Log a fatal message. Always shown.
pub fn fatal(message: &str) {
    emit(LogLevel::Fatal, Tone::Red, message);
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    note(Tone::Purple, &border);
    note(Tone::Purple, &format!("  {}", title));
    note(Tone::Purple, &border);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    info(&format!("    {}", message));
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    info(&format!("[SUMMARY] {}", title));
    for (key, value) in items {
        sub_item(&format!("{}: {}", key, value));
    }
}
