//! Sliding-window call accounting for a single endpoint.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Timestamps of the calls made to one endpoint within the last `length`.
///
/// Entries older than the window are dropped lazily whenever the window is
/// consulted. The number of retained entries never exceeds `cap`.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    calls: VecDeque<Instant>,
    cap: usize,
    length: Duration,
}

impl SlidingWindow {
    pub fn new(cap: usize, length: Duration) -> Self {
        Self {
            calls: VecDeque::new(),
            cap,
            length,
        }
    }

    fn trim(&mut self, now: Instant) {
        while let Some(&oldest) = self.calls.front() {
            if now.saturating_duration_since(oldest) >= self.length {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records a call at `now` if the window has room for it.
    ///
    /// # Returns
    /// - `true` - The call was recorded and may be sent
    /// - `false` - The window is full; nothing was recorded
    pub fn try_reserve(&mut self, now: Instant) -> bool {
        self.trim(now);

        if self.calls.len() >= self.cap {
            return false;
        }

        self.calls.push_back(now);
        true
    }

    /// Calls still allowed in the current window.
    pub fn remaining(&mut self, now: Instant) -> usize {
        self.trim(now);
        self.cap.saturating_sub(self.calls.len())
    }

    /// Time until the window has room again; zero if it has room now.
    pub fn wait_time(&mut self, now: Instant) -> Duration {
        self.trim(now);

        if self.calls.len() < self.cap {
            return Duration::ZERO;
        }

        match self.calls.front() {
            Some(&oldest) => self
                .length
                .saturating_sub(now.saturating_duration_since(oldest)),
            None => Duration::ZERO,
        }
    }

    /// Calls recorded in the window as of `now`.
    pub fn usage(&mut self, now: Instant) -> usize {
        self.trim(now);
        self.calls.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn length(&self) -> Duration {
        self.length
    }
}
