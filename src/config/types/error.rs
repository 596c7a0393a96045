//! Configuration error types.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading `syncpad.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config syntax")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),

    // no #[from]: the report is printed by Display alone
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One rejected setting.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Dotted key, e.g. `watch.debounce_ms`
    pub key: &'static str,
    pub reason: String,
    pub hint: Option<String>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} {}: {}", "×".red(), self.key.cyan(), self.reason)?;
        match &self.hint {
            Some(hint) => write!(f, "\n    {} {hint}", "try:".yellow()),
            None => Ok(()),
        }
    }
}

/// Problems gathered from every section so one run reports them all.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    problems: Vec<Problem>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, key: &'static str, reason: impl Into<String>) {
        self.push(key, reason.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        key: &'static str,
        reason: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(key, reason.into(), Some(hint.into()));
    }

    fn push(&mut self, key: &'static str, reason: String, hint: Option<String>) {
        self.problems.push(Problem { key, reason, hint });
    }

    pub fn has_errors(&self) -> bool {
        !self.problems.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    #[cfg(test)]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// `Err(self)` when anything was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.problems.len();
        let noun = if count == 1 { "problem" } else { "problems" };
        write!(f, "{} ({count} {noun})", "syncpad.toml rejected".red().bold())?;
        for problem in &self.problems {
            write!(f, "\n{problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}
