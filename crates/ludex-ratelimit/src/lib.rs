// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-platform sliding-window request governor.
//!
//! Each platform gets a timestamped request log over a fixed window. A
//! reservation either records a new entry or reports how long until the
//! oldest entry ages out. Callers that receive a backoff fail fast with
//! `LudexError::RateLimited` and record the error against the current item
//! rather than stalling the whole batch.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use ludex_core::Platform;

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The request was recorded; the caller may proceed.
    Granted,
    /// The window is full; wait this long before the oldest entry expires.
    Backoff(Duration),
}

/// A request window: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub max_requests: usize,
    pub window: Duration,
}

impl Window {
    pub const fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Default window for a platform.
///
/// Epic has no request cap; its client paces itself with an inter-page delay
/// instead, so its reservations are always granted.
pub fn default_window(platform: Platform) -> Option<Window> {
    match platform {
        Platform::Steam => Some(Window::new(200, Duration::from_secs(300))),
        Platform::Psn | Platform::Xbox => Some(Window::new(30, Duration::from_secs(60))),
        Platform::Epic => None,
    }
}

/// Sliding-window limiter shared across all platform clients.
///
/// Reservations are global per platform regardless of how many clients or
/// concurrent syncs hold the limiter.
pub struct SlidingWindowLimiter {
    windows: HashMap<Platform, Window>,
    logs: Mutex<HashMap<Platform, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter with the default per-platform windows.
    pub fn new() -> Self {
        let windows = [Platform::Steam, Platform::Psn, Platform::Xbox, Platform::Epic]
            .into_iter()
            .filter_map(|p| default_window(p).map(|w| (p, w)))
            .collect();
        Self {
            windows,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a limiter with explicit windows (platforms absent from the map
    /// are unlimited). Used by tests and config overrides.
    pub fn with_windows(windows: HashMap<Platform, Window>) -> Self {
        Self {
            windows,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Attempts to reserve one request slot for `platform`.
    ///
    /// Prunes log entries older than the window, then either records a new
    /// entry and grants, or reports the wait until the oldest entry expires.
    pub fn try_reserve(&self, platform: Platform) -> Reservation {
        self.try_reserve_at(platform, Instant::now())
    }

    fn try_reserve_at(&self, platform: Platform, now: Instant) -> Reservation {
        let Some(window) = self.windows.get(&platform) else {
            return Reservation::Granted;
        };

        // Poisoning only means a panic elsewhere while holding the lock;
        // the log itself is still valid timestamps.
        let mut logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        let log = logs.entry(platform).or_default();

        while let Some(oldest) = log.front() {
            if now.duration_since(*oldest) >= window.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() < window.max_requests {
            log.push_back(now);
            return Reservation::Granted;
        }

        // A zero-capacity window has no oldest entry; the wait is the whole
        // window.
        let wait = log
            .front()
            .map(|oldest| window.window - now.duration_since(*oldest))
            .unwrap_or(window.window);
        debug!(%platform, wait_ms = wait.as_millis() as u64, "rate window full");
        Reservation::Backoff(wait)
    }

    /// Convenience wrapper turning a backoff into the canonical error.
    pub fn reserve_or_fail(&self, platform: Platform) -> Result<(), ludex_core::LudexError> {
        match self.try_reserve(platform) {
            Reservation::Granted => Ok(()),
            Reservation::Backoff(wait) => {
                Err(ludex_core::LudexError::RateLimited { platform, wait })
            }
        }
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}
