use std::time::{Duration, Instant};

use super::types::ChangeSource;

/// Sleep used when nothing is pending
const IDLE: Duration = Duration::from_secs(86400);

/// Pure debouncer: only handles timing and coalescing.
///
/// Every signal re-arms the window; once it stays quiet for `window`,
/// the whole burst is released as a single reconciliation.
pub(super) struct Debouncer {
    window: Duration,
    /// First channel that fired in the current burst
    pub(super) pending: Option<ChangeSource>,
    /// Signals folded into the current burst
    pub(super) hits: usize,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            hits: 0,
            last_event: None,
        }
    }

    /// Record a signal, replacing any scheduled release.
    pub(super) fn add(&mut self, source: ChangeSource, now: Instant) {
        self.pending.get_or_insert(source);
        self.hits += 1;
        self.last_event = Some(now);
    }

    pub(super) fn is_ready(&self, now: Instant) -> bool {
        self.last_event
            .is_some_and(|last| now.saturating_duration_since(last) >= self.window)
    }

    /// Release the burst if the window has elapsed.
    pub(super) fn take_if_ready(&mut self, now: Instant) -> Option<(ChangeSource, usize)> {
        if !self.is_ready(now) {
            return None;
        }

        self.last_event = None;
        let hits = std::mem::take(&mut self.hits);
        self.pending.take().map(|source| (source, hits))
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE;
        };

        self.window
            .saturating_sub(now.saturating_duration_since(last_event))
            .max(Duration::from_millis(1))
    }
}
