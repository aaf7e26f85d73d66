//! Trailing-edge debouncer driven by an explicit clock
//!
//! Callers pass `Instant`s in, so the UI loop uses `Instant::now()` and tests
//! advance a virtual clock by hand.

use std::time::{Duration, Instant};

/// Quiet period before the search input is turned into suggestions
pub const INPUT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds at most one pending action; every `reset` replaces it and restarts the timer.
#[derive(Debug)]
pub struct Debouncer<A> {
    delay: Duration,
    pending: Option<(A, Instant)>,
}

impl<A> Debouncer<A> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending action and restart the quiet period from `now`
    pub fn reset(&mut self, action: A, now: Instant) {
        self.pending = Some((action, now + self.delay));
    }

    /// Take the pending action if its quiet period has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> Option<A> {
        let due = matches!(self.pending, Some((_, deadline)) if now >= deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|(action, _)| action)
    }

    /// Drop the pending action without running it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending action becomes due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, d)| *d)
    }
}
