// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Engine-local error type. Wraps [`vorion_core::error::VorionError`] with
//! the one failure mode unique to this crate: the rule evaluator rejecting
//! or erroring, which the engine converts into a fallback decision rather
//! than propagating, but which is still useful as a typed value for
//! logging and tests.

use vorion_core::error::VorionError;

#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    #[error("rule evaluator failed: {0}")]
    EvaluatorFailed(String),

    #[error("circuit breaker open for enforcement engine")]
    BreakerOpen,

    #[error(transparent)]
    Core(#[from] VorionError),
}
