// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Sliding-window, per-tenant rate limiting for the Vorion decision core.
//!
//! [`RateLimiter`] holds one [`windows::SlidingWindows`] per tenant key in a
//! `dashmap::DashMap`, so concurrent checks across tenants never contend on
//! a single lock. Three granularities (second/minute/hour) are checked
//! together; a request is admitted only if all three have headroom.
//!
//! # Example
//!
//! ```rust
//! use vorion_ratelimit::{RateLimiter, tiers::RateLimitTier};
//!
//! let limiter = RateLimiter::new(true);
//! limiter.set_tier("tenant-1", RateLimitTier { per_second: 1, per_minute: 60, per_hour: 1000 });
//!
//! assert!(limiter.check("tenant-1", 0).allowed);
//! assert!(!limiter.check("tenant-1", 0).allowed);
//! ```

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use vorion_core::circuit_breaker::{BreakerConfig, CallPermit, CircuitBreaker};

pub mod tiers;
pub mod windows;

use tiers::RateLimitTier;
use windows::{RemainingQuota, ResetAt, SlidingWindows, WindowsOutcome};

/// Full outcome of a [`RateLimiter::check`] call: whether the request was
/// admitted, remaining quota and reset times for every granularity, and a
/// retry hint when rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub remaining: RemainingQuota,
    pub reset_at: ResetAt,
    pub retry_after_ms: Option<u64>,
}

impl From<WindowsOutcome> for RateLimitOutcome {
    fn from(outcome: WindowsOutcome) -> Self {
        Self {
            allowed: outcome.allowed,
            remaining: outcome.remaining,
            reset_at: outcome.reset_at,
            retry_after_ms: outcome.retry_after_ms,
        }
    }
}

/// Build the backing-map key for an unauthenticated, IP-identified caller.
pub fn anonymous_key(ip: &str) -> String {
    format!("anon:{ip}")
}

/// Per-tenant sliding-window rate limiter.
pub struct RateLimiter {
    windows: DashMap<String, SlidingWindows>,
    tiers: DashMap<String, RateLimitTier>,
    default_tier: RateLimitTier,
    breaker: CircuitBreaker,
    fail_open: bool,
}

impl RateLimiter {
    pub fn new(fail_open: bool) -> Self {
        Self {
            windows: DashMap::new(),
            tiers: DashMap::new(),
            default_tier: RateLimitTier::FREE,
            breaker: CircuitBreaker::new("ratelimit_backend", BreakerConfig::default()),
            fail_open,
        }
    }

    /// Assign a tier override for a specific tenant key.
    pub fn set_tier(&self, key: &str, tier: RateLimitTier) {
        self.tiers.insert(key.to_string(), tier);
    }

    fn tier_for(&self, key: &str) -> RateLimitTier {
        self.tiers.get(key).map(|entry| *entry).unwrap_or(self.default_tier)
    }

    /// Check whether `key` may proceed at `now_ms`, admitting the request
    /// and charging quota if so. The outcome always carries remaining
    /// quota and reset times for every granularity, not just an
    /// allow/reject bit.
    ///
    /// If the circuit breaker guarding the backing store is open (modeling
    /// an unreachable distributed rate-limit store in a multi-node
    /// deployment), the configured `fail_open`/`fail_closed` policy
    /// decides the outcome instead of consulting local state.
    pub fn check(&self, key: &str, now_ms: u64) -> RateLimitOutcome {
        if self.breaker.before_call() == CallPermit::Rejected {
            return if self.fail_open {
                tracing::warn!(key, "rate limiter backend unavailable, failing open");
                RateLimitOutcome {
                    allowed: true,
                    remaining: RemainingQuota { second: 0, minute: 0, hour: 0 },
                    reset_at: ResetAt { second_ms: now_ms, minute_ms: now_ms, hour_ms: now_ms },
                    retry_after_ms: None,
                }
            } else {
                tracing::warn!(key, "rate limiter backend unavailable, failing closed");
                RateLimitOutcome {
                    allowed: false,
                    remaining: RemainingQuota { second: 0, minute: 0, hour: 0 },
                    reset_at: ResetAt { second_ms: now_ms, minute_ms: now_ms, hour_ms: now_ms },
                    retry_after_ms: Some(1_000),
                }
            };
        }

        let tier = self.tier_for(key);
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| SlidingWindows::new(&tier, now_ms));

        let outcome = entry.admit(now_ms);
        self.breaker.on_success();
        outcome.into()
    }

    /// Evict tenants that have not been checked in more than
    /// `idle_threshold_ms`, bounding the map's memory footprint.
    pub fn sweep(&self, now_ms: u64, idle_threshold_ms: u64) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, windows| now_ms.saturating_sub(windows.last_seen_ms) < idle_threshold_ms);
        let evicted = before - self.windows.len();
        if evicted > 0 {
            tracing::info!(evicted, "rate limiter sweep evicted idle tenants");
        }
        evicted
    }

    /// Spawn a background task that calls [`Self::sweep`] every `interval`,
    /// evicting tenants idle longer than `idle_threshold`. The default
    /// cadence is every 5 minutes, evicting tenants idle more than an hour.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        idle_threshold: Duration,
        now_ms_fn: impl Fn() -> u64 + Send + 'static,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.sweep(now_ms_fn(), idle_threshold.as_millis() as u64);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_within_tier_then_rejects() {
        let limiter = RateLimiter::new(false);
        limiter.set_tier("tenant-1", RateLimitTier { per_second: 2, per_minute: 1000, per_hour: 100_000 });
        assert!(limiter.check("tenant-1", 0).allowed);
        assert!(limiter.check("tenant-1", 0).allowed);
        assert!(!limiter.check("tenant-1", 0).allowed);
    }

    #[test]
    fn rejected_check_carries_retry_after_and_remaining() {
        let limiter = RateLimiter::new(false);
        limiter.set_tier("tenant-1", RateLimitTier { per_second: 1, per_minute: 1000, per_hour: 100_000 });
        limiter.check("tenant-1", 0);
        let outcome = limiter.check("tenant-1", 100);
        assert!(!outcome.allowed);
        assert_eq!(outcome.retry_after_ms, Some(900));
        assert_eq!(outcome.remaining.second, 0);
    }

    #[test]
    fn different_tenants_have_independent_windows() {
        let limiter = RateLimiter::new(false);
        limiter.set_tier("a", RateLimitTier { per_second: 1, per_minute: 10, per_hour: 100 });
        limiter.set_tier("b", RateLimitTier { per_second: 1, per_minute: 10, per_hour: 100 });
        assert!(limiter.check("a", 0).allowed);
        assert!(limiter.check("b", 0).allowed);
    }

    #[test]
    fn anonymous_key_is_distinguishable() {
        assert_eq!(anonymous_key("203.0.113.5"), "anon:203.0.113.5");
    }

    #[test]
    fn sweep_evicts_idle_tenants() {
        let limiter = RateLimiter::new(false);
        limiter.set_tier("stale", RateLimitTier::FREE);
        limiter.check("stale", 0);
        let evicted = limiter.sweep(10_000_000, 60_000);
        assert_eq!(evicted, 1);
    }

    #[test]
    fn sweep_keeps_recently_seen_tenants() {
        let limiter = RateLimiter::new(false);
        limiter.set_tier("fresh", RateLimitTier::FREE);
        limiter.check("fresh", 1_000_000);
        let evicted = limiter.sweep(1_000_500, 60_000);
        assert_eq!(evicted, 0);
    }
}
