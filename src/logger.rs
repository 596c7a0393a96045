//! Terminal output for the sync server.
//!
//! `log!("tag"; ...)` prints a colored `[tag]` line, `debug!` does the same
//! only under `--verbose`, and `status_success` / `status_error` keep a
//! single rewritable status line for sync events.

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
    time::SystemTime,
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(on: bool) {
    VERBOSE.store(on, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// `log!("tag"; "fmt", args..)`
#[macro_export]
macro_rules! log {
    ($tag:expr; $($arg:tt)*) => {{
        $crate::logger::log($tag, &format!($($arg)*))
    }};
}

/// Like [`log!`], printed only in verbose mode.
#[macro_export]
macro_rules! debug {
    ($tag:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($tag, &format!($($arg)*))
        }
    }};
}

pub fn log(tag: &str, message: &str) {
    let prefix = tag_prefix(tag);
    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

fn tag_prefix(tag: &str) -> String {
    let label = format!("[{tag}]");
    match tag.to_ascii_lowercase().as_str() {
        "serve" => label.bright_blue().bold().to_string(),
        "watch" => label.bright_green().bold().to_string(),
        "sync" => label.bright_cyan().bold().to_string(),
        "error" | "persist" => label.bright_red().bold().to_string(),
        _ => label.bright_yellow().bold().to_string(),
    }
}

/// Wall clock (UTC) as `HH:MM:SS`.
fn clock(epoch_secs: u64) -> String {
    let (h, m, s) = ((epoch_secs / 3600) % 24, (epoch_secs / 60) % 60, epoch_secs % 60);
    format!("{h:02}:{m:02}:{s:02}")
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Status block that replaces the previous one in place.
pub struct WatchStatus {
    /// Rows printed last time, cleared before the next write
    rows: usize,
}

static STATUS: LazyLock<Mutex<WatchStatus>> = LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self { rows: 0 }
    }

    pub fn success(&mut self, message: &str) {
        self.replace(&"✓".green().to_string(), message);
    }

    pub fn error(&mut self, summary: &str, detail: &str) {
        self.replace(&"✗".red().to_string(), &join_detail(summary, detail));
    }

    fn replace(&mut self, mark: &str, message: &str) {
        let mut out = stdout().lock();
        if let Ok(rows @ 1..) = u16::try_from(self.rows) {
            execute!(out, cursor::MoveUp(rows), Clear(ClearType::FromCursorDown)).ok();
        }
        let stamp = format!("[{}]", clock(epoch_secs())).dimmed().to_string();
        writeln!(out, "{stamp} {mark} {message}").ok();
        out.flush().ok();
        self.rows = rows_of(message);
    }
}

fn join_detail(summary: &str, detail: &str) -> String {
    if detail.is_empty() {
        summary.to_owned()
    } else {
        format!("{summary}\n{detail}")
    }
}

fn rows_of(message: &str) -> usize {
    message.lines().count().max(1)
}

pub fn status_success(message: &str) {
    STATUS.lock().success(message);
}

pub fn status_error(summary: &str, detail: &str) {
    STATUS.lock().error(summary, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_starts_clean() {
        assert_eq!(WatchStatus::new().rows, 0);
    }

    #[test]
    fn test_rows_single_line() {
        assert_eq!(rows_of("external edit adopted (5 bytes)"), 1);
        assert_eq!(rows_of(""), 1);
    }

    #[test]
    fn test_rows_with_detail() {
        let message = join_detail("write failed", "permission denied\n  at document.txt");
        assert_eq!(rows_of(&message), 3);
    }

    #[test]
    fn test_join_without_detail() {
        assert_eq!(join_detail("write failed", ""), "write failed");
    }

    #[test]
    fn test_clock_wraps_days() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(3600 * 25 + 61), "01:01:01");
    }

    #[test]
    fn test_tag_prefix_keeps_label() {
        assert!(tag_prefix("sync").contains("[sync]"));
        assert!(tag_prefix("other").contains("[other]"));
    }
}
