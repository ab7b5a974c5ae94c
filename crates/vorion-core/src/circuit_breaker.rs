// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Shared circuit breaker used in front of every external dependency:
//! decision-cache reads/writes, audit persistence, and the rule evaluator.
//!
//! `CLOSED -> OPEN` after `failure_threshold` consecutive failures within
//! `monitor_window`. `OPEN -> HALF_OPEN` after `reset_timeout` elapses.
//! `HALF_OPEN -> CLOSED` after `success_threshold` consecutive successes, or
//! back to `OPEN` on any failure while half-open. Every transition is
//! logged.

#![cfg(feature = "std")]

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Circuit breaker state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    fn as_str(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

/// Tunable thresholds. Defaults match spec §5: N=5, reset=30s, K=3,
/// monitor=60s.
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub reset_timeout: Duration,
    pub monitor_window: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            reset_timeout: Duration::from_secs(30),
            monitor_window: Duration::from_secs(60),
        }
    }
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    window_started_at: Instant,
    opened_at: Option<Instant>,
}

/// A single circuit breaker guarding one external dependency.
///
/// Named so its `tracing` spans identify which dependency tripped.
pub struct CircuitBreaker {
    name: &'static str,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

/// Returned by [`CircuitBreaker::before_call`]; callers must report the
/// outcome via [`CircuitBreaker::on_success`] / [`CircuitBreaker::on_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPermit {
    /// The call may proceed.
    Proceed,
    /// The breaker is open; the caller must use its fallback path instead.
    Rejected,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: BreakerConfig) -> Self {
        Self {
            name,
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                window_started_at: Instant::now(),
                opened_at: None,
            }),
        }
    }

    pub fn current_state(&self) -> BreakerState {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner()).state
    }

    /// Decide whether a call may proceed, transitioning `OPEN -> HALF_OPEN`
    /// if the reset timeout has elapsed.
    pub fn before_call(&self) -> CallPermit {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => CallPermit::Proceed,
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|opened_at| opened_at.elapsed())
                    .unwrap_or_default();
                if elapsed >= self.config.reset_timeout {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                    inner.consecutive_successes = 0;
                    CallPermit::Proceed
                } else {
                    CallPermit::Rejected
                }
            }
        }
    }

    /// Record a successful call.
    pub fn on_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner.consecutive_failures = 0;
        match inner.state {
            BreakerState::Closed => {}
            BreakerState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.config.success_threshold {
                    self.transition(&mut inner, BreakerState::Closed);
                }
            }
            BreakerState::Open => {
                // A success should not reach us while open; before_call()
                // rejects those calls. Defensive no-op.
            }
        }
    }

    /// Record a failed call.
    pub fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        match inner.state {
            BreakerState::Closed => {
                if inner.window_started_at.elapsed() > self.config.monitor_window {
                    inner.window_started_at = Instant::now();
                    inner.consecutive_failures = 0;
                }
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    self.transition(&mut inner, BreakerState::Open);
                    inner.opened_at = Some(Instant::now());
                }
            }
            BreakerState::HalfOpen => {
                self.transition(&mut inner, BreakerState::Open);
                inner.opened_at = Some(Instant::now());
                inner.consecutive_successes = 0;
            }
            BreakerState::Open => {}
        }
    }

    fn transition(&self, inner: &mut Inner, next: BreakerState) {
        if inner.state != next {
            tracing::info!(
                breaker = self.name,
                from = inner.state.as_str(),
                to = next.as_str(),
                "circuit breaker state transition"
            );
        }
        inner.state = next;
    }
}
