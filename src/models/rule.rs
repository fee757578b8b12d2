// src/models/rule.rs

//! Content rules and the rule file loader.
//!
//! A rule file holds one rule per line:
//!
//! ```text
//! # pattern, log file, output directory
//! ^SECRET,match.log,matches/
//! password\s*[:=],passwords.log,passwords/
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A pattern may itself
//! contain commas: every field but the last two is joined back into the
//! pattern.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};

use crate::error::{AppError, Result};

const COMMENT_MARKER: char = '#';
const FIELD_SEPARATOR: char = ',';

/// A single content rule: pattern, append log and output directory.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    regex: Regex,
    pub log_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Rule {
    /// Build a rule, compiling its pattern case-insensitively.
    pub fn new(
        pattern: impl Into<String>,
        log_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern,
            regex,
            log_file: log_file.into(),
            output_dir: output_dir.into(),
        })
    }

    /// The pattern as written in the rule file.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled, case-insensitive pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.log_file == other.log_file
            && self.output_dir == other.output_dir
    }
}

impl Eq for Rule {}

/// Canonical rule file form: `pattern,logFile,outputDir`.
///
/// A pattern starting with the comment marker is written with one leading
/// space so the line still loads as a rule.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pattern.starts_with(COMMENT_MARKER) {
            f.write_str(" ")?;
        }
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.pattern,
            self.log_file.display(),
            self.output_dir.display(),
            sep = FIELD_SEPARATOR
        )
    }
}

/// Ordered, immutable list of rules. Declaration order is match order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Load a rule file. Any unreadable file or malformed line is an error;
    /// a partially loaded rule set is never returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::rule_file(
                0,
                format!("{} not found or not accessible: {}", path.display(), e),
            )
        })?;
        Self::parse(&content)
    }

    /// Parse rule file content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rules = Vec::new();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            rules.push(parse_line(index + 1, line)?);
        }

        Ok(Self { rules })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Re-serialize the rule set in canonical rule file form.
    pub fn to_file_content(&self) -> String {
        self.rules
            .iter()
            .map(|rule| format!("{rule}\n"))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<Rule> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();

    if fields.len() < 3 {
        return Err(AppError::rule_file(
            line_no,
            format!(
                "expected `pattern,log file,directory`, found {} field(s)",
                fields.len()
            ),
        ));
    }

    let split = fields.len() - 2;
    let pattern = fields[..split].join(",");
    let (log_file, output_dir) = (fields[split], fields[split + 1]);

    if pattern.is_empty() || log_file.is_empty() || output_dir.is_empty() {
        return Err(AppError::rule_file(line_no, "empty field"));
    }

    Rule::new(pattern, log_file, output_dir)
        .map_err(|e| AppError::rule_file(line_no, format!("invalid pattern: {e}")))
}
