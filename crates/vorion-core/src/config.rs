// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Engine-level configuration.
//!
//! [`Config`] is the single entry point for tuning every decision-core
//! component at construction time. All fields have sensible defaults so
//! `Config::default()` is always a valid starting point.

use serde::{Deserialize, Serialize};

/// Top-level configuration threaded through the trust kernel, cache,
/// rate limiter, audit sink, and enforcement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// When `true`, a missing trust assignment is treated as the lowest
    /// tier rather than an outright denial. Defaults to `false`.
    pub default_deny_on_missing_trust: bool,

    /// Local in-process decision-cache capacity (LRU). Default 10,000.
    pub cache_local_capacity: usize,
    /// Decision-cache TTL in milliseconds. Default 60,000 (60s).
    pub cache_ttl_ms: u64,
    /// Cache cleanup sweep interval in milliseconds. Default 30,000 (30s).
    pub cache_sweep_interval_ms: u64,

    /// Audit buffer hard ceiling before oldest records are dropped.
    /// Default 10,000.
    pub audit_buffer_ceiling: usize,
    /// Audit flush trigger: batch size. Default 100.
    pub audit_batch_size: usize,
    /// Audit flush trigger: time interval in milliseconds. Default 1,000.
    pub audit_flush_interval_ms: u64,
    /// Bounded flush attempts during shutdown. Default 5.
    pub audit_shutdown_flush_attempts: u32,

    /// Per-constraint evaluation timeout in milliseconds. Default 100.
    pub constraint_timeout_ms: u64,

    /// Circuit breaker: consecutive failures before opening. Default 5.
    pub breaker_failure_threshold: u32,
    /// Circuit breaker: consecutive successes before closing. Default 3.
    pub breaker_success_threshold: u32,
    /// Circuit breaker: reset timeout in milliseconds. Default 30,000.
    pub breaker_reset_timeout_ms: u64,
    /// Circuit breaker: failure-counting window in milliseconds.
    /// Default 60,000.
    pub breaker_monitor_window_ms: u64,

    /// If the rate-limit backing store is unavailable, admit requests with
    /// a logged warning instead of denying. Default `true`.
    pub rate_limit_fail_open: bool,

    /// Validator: maximum accepted payload size in bytes. Default 1 MiB.
    pub max_payload_bytes: usize,

    /// Replay: default comparator timing-delta threshold, as a fraction
    /// (0.2 = 20%), beyond which a timing difference is `warning` rather
    /// than `info`. Default 0.2.
    pub replay_timing_warn_fraction: f64,
    /// Replay: default bulk-simulation concurrency. Default 10.
    pub simulate_concurrency: usize,

    /// Scrub error messages for secret-looking substrings before they
    /// reach a client-facing envelope. Should be `true` outside
    /// development. Default `true`.
    pub production_error_sanitization: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_deny_on_missing_trust: false,
            cache_local_capacity: 10_000,
            cache_ttl_ms: 60_000,
            cache_sweep_interval_ms: 30_000,
            audit_buffer_ceiling: 10_000,
            audit_batch_size: 100,
            audit_flush_interval_ms: 1_000,
            audit_shutdown_flush_attempts: 5,
            constraint_timeout_ms: 100,
            breaker_failure_threshold: 5,
            breaker_success_threshold: 3,
            breaker_reset_timeout_ms: 30_000,
            breaker_monitor_window_ms: 60_000,
            rate_limit_fail_open: true,
            max_payload_bytes: 1024 * 1024,
            replay_timing_warn_fraction: 0.2,
            simulate_concurrency: 10,
            production_error_sanitization: true,
        }
    }
}
