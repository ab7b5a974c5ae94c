// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Fixed-window counters for the second/minute/hour granularities. Each
//! window lazily resets when it is queried past its own boundary, rather
//! than via a background tick — the hot path never does more than an
//! arithmetic comparison and, occasionally, a reset.

use serde::{Deserialize, Serialize};

/// A single fixed window: a count of requests admitted since
/// `window_started_ms`, compared against `limit` on every check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Window {
    pub limit: u32,
    pub duration_ms: u64,
    pub count: u32,
    pub window_started_ms: u64,
}

impl Window {
    pub fn new(limit: u32, duration_ms: u64, now_ms: u64) -> Self {
        Self {
            limit,
            duration_ms,
            count: 0,
            window_started_ms: now_ms,
        }
    }

    /// Lazily reset the window if `now_ms` has moved past its boundary,
    /// then attempt to admit one request. Returns `true` if admitted.
    pub fn try_admit(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.window_started_ms) >= self.duration_ms {
            self.window_started_ms = now_ms;
            self.count = 0;
        }
        if self.count < self.limit {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self, now_ms: u64) -> u32 {
        if now_ms.saturating_sub(self.window_started_ms) >= self.duration_ms {
            self.limit
        } else {
            self.limit.saturating_sub(self.count)
        }
    }

    pub fn retry_after_ms(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.window_started_ms);
        self.duration_ms.saturating_sub(elapsed)
    }

    /// Absolute timestamp at which this window's quota next resets.
    pub fn reset_at_ms(&self, now_ms: u64) -> u64 {
        if now_ms.saturating_sub(self.window_started_ms) >= self.duration_ms {
            now_ms
        } else {
            self.window_started_ms + self.duration_ms
        }
    }
}

/// Remaining quota across all three granularities, as surfaced to a caller
/// regardless of whether the request was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingQuota {
    pub second: u32,
    pub minute: u32,
    pub hour: u32,
}

/// Absolute reset timestamps for all three granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetAt {
    pub second_ms: u64,
    pub minute_ms: u64,
    pub hour_ms: u64,
}

/// Full outcome of a [`SlidingWindows::admit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsOutcome {
    pub allowed: bool,
    pub remaining: RemainingQuota,
    pub reset_at: ResetAt,
    pub retry_after_ms: Option<u64>,
}

/// Three granularities tracked per tenant: second, minute, hour. A request
/// is admitted only if all three windows admit it — the narrowest window
/// typically trips first, but a burst that clears the per-second window
/// can still be caught by the per-minute or per-hour ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidingWindows {
    pub per_second: Window,
    pub per_minute: Window,
    pub per_hour: Window,
    pub last_seen_ms: u64,
}

impl SlidingWindows {
    pub fn new(tier: &super::tiers::RateLimitTier, now_ms: u64) -> Self {
        Self {
            per_second: Window::new(tier.per_second, 1_000, now_ms),
            per_minute: Window::new(tier.per_minute, 60_000, now_ms),
            per_hour: Window::new(tier.per_hour, 3_600_000, now_ms),
            last_seen_ms: now_ms,
        }
    }

    /// Attempt to admit a request across all three granularities. On
    /// rejection from a narrower window, wider windows are not charged —
    /// a rejected request never counts against quota it didn't consume.
    /// The returned outcome always carries remaining quota and reset times
    /// for every granularity, whether or not the request was admitted.
    pub fn admit(&mut self, now_ms: u64) -> WindowsOutcome {
        self.last_seen_ms = now_ms;

        let retry_after_ms = if !self.per_second.try_admit(now_ms) {
            Some(self.per_second.retry_after_ms(now_ms))
        } else if !self.per_minute.try_admit(now_ms) {
            self.per_second.count = self.per_second.count.saturating_sub(1);
            Some(self.per_minute.retry_after_ms(now_ms))
        } else if !self.per_hour.try_admit(now_ms) {
            self.per_second.count = self.per_second.count.saturating_sub(1);
            self.per_minute.count = self.per_minute.count.saturating_sub(1);
            Some(self.per_hour.retry_after_ms(now_ms))
        } else {
            None
        };

        WindowsOutcome {
            allowed: retry_after_ms.is_none(),
            remaining: RemainingQuota {
                second: self.per_second.remaining(now_ms),
                minute: self.per_minute.remaining(now_ms),
                hour: self.per_hour.remaining(now_ms),
            },
            reset_at: ResetAt {
                second_ms: self.per_second.reset_at_ms(now_ms),
                minute_ms: self.per_minute.reset_at_ms(now_ms),
                hour_ms: self.per_hour.reset_at_ms(now_ms),
            },
            retry_after_ms,
        }
    }
}
