// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The closed error-code set and error envelope shared by every Vorion
//! crate.
//!
//! [`VorionError`] maps 1-1 onto the error codes in spec §6. Only
//! client-surfaced variants are meant to propagate unchanged to a caller;
//! transient and fatal-integrity failures are recovered locally (circuit
//! breaker fallback, cache-miss recomputation) before a caller ever sees
//! them — see `vorion-engine`'s fallback-decision path.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// The closed set of error codes spec §6 maps 1-1 to HTTP-like statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    InvalidInput,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InvalidState,
    RateLimitExceeded,
    PayloadTooLarge,
    Internal,
    ExternalService,
    Timeout,
    ServiceUnavailable,
    TenantMismatch,
}

/// A typed Vorion error. `thiserror`-derived so every crate downstream gets
/// `core::error::Error` + `Display` for free.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum VorionError {
    #[error("validation failed at {path}: {message}")]
    Validation { path: String, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("rate limit exceeded, retry after {retry_after_ms}ms")]
    RateLimitExceeded { retry_after_ms: u64 },

    #[error("payload too large: {size} bytes exceeds budget of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("external service failure ({dependency}): {message}")]
    ExternalService { dependency: String, message: String },

    #[error("operation timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// An intent's tenant claim does not match the entity's sealed
    /// [`crate::types::ContextBinding::tenant_id`]. Denied before any rule
    /// evaluation runs; always a critical audit event.
    #[error("tenant mismatch: intent claims {claimed}, entity bound to {bound}")]
    TenantMismatch { claimed: String, bound: String },

    /// Data-integrity failure: integrity-hash mismatch, audit hash-chain
    /// breakage, or role-gate matrix mismatch. Surfaced as a critical audit
    /// event; the triggering request is denied. Not part of the
    /// client-facing closed set, but every variant above still needs a
    /// mapping — integrity failures map to `Internal` at the envelope
    /// boundary so the client-visible taxonomy stays closed.
    #[error("data integrity violation: {0}")]
    IntegrityViolation(String),
}

impl VorionError {
    /// The closed error code this error maps to at the client boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            VorionError::Validation { .. } => ErrorCode::ValidationError,
            VorionError::InvalidInput(_) => ErrorCode::InvalidInput,
            VorionError::Unauthorized => ErrorCode::Unauthorized,
            VorionError::Forbidden(_) => ErrorCode::Forbidden,
            VorionError::NotFound(_) => ErrorCode::NotFound,
            VorionError::Conflict(_) => ErrorCode::Conflict,
            VorionError::InvalidState(_) => ErrorCode::InvalidState,
            VorionError::RateLimitExceeded { .. } => ErrorCode::RateLimitExceeded,
            VorionError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            VorionError::Internal(_) => ErrorCode::Internal,
            VorionError::ExternalService { .. } => ErrorCode::ExternalService,
            VorionError::Timeout { .. } => ErrorCode::Timeout,
            VorionError::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            VorionError::TenantMismatch { .. } => ErrorCode::TenantMismatch,
            VorionError::IntegrityViolation(_) => ErrorCode::Internal,
        }
    }

    /// `retry_after` hint in milliseconds, when applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            VorionError::RateLimitExceeded { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }

    /// Scrub a message for accidental secret leakage before it reaches a
    /// production error envelope.
    ///
    /// Looks for the substrings spec §7 names (`password`, `secret`,
    /// `token`, `key`, `credential`, case-insensitively) and replaces the
    /// whole message if any are present. This is a blunt instrument by
    /// design: a message that merely mentions "api key" is not worth
    /// partially redacting when the safe default is to drop it entirely.
    pub fn sanitized_message(message: &str) -> String {
        let lower = message.to_ascii_lowercase();
        const SENSITIVE: [&str; 5] = ["password", "secret", "token", "key", "credential"];
        if SENSITIVE.iter().any(|needle| lower.contains(needle)) {
            String::from("internal error (details withheld)")
        } else {
            String::from(message)
        }
    }
}

/// `{success: false, error: {...}, meta: {...}, trace?: {...}}` — spec §6's
/// output envelope for any non-success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
    pub meta: ErrorMeta,
    pub trace: Option<ErrorTrace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMeta {
    pub request_id: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorTrace {
    pub trace_id: String,
}

impl ErrorEnvelope {
    /// Build an envelope from a [`VorionError`], a request id, and the
    /// current timestamp. `production` gates message sanitisation per
    /// spec §7's layer-4 (programmer error) handling.
    pub fn from_error(
        error: &VorionError,
        request_id: String,
        timestamp_ms: u64,
        trace_id: Option<String>,
        production: bool,
    ) -> Self {
        let message = if production {
            VorionError::sanitized_message(&error.to_string())
        } else {
            error.to_string()
        };
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: error.code(),
                message,
                details: None,
                retry_after: error.retry_after_ms(),
            },
            meta: ErrorMeta {
                request_id,
                timestamp_ms,
            },
            trace: trace_id.map(|trace_id| ErrorTrace { trace_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_error_carries_retry_after() {
        let error = VorionError::RateLimitExceeded { retry_after_ms: 500 };
        assert_eq!(error.code(), ErrorCode::RateLimitExceeded);
        assert_eq!(error.retry_after_ms(), Some(500));
    }

    #[test]
    fn sensitive_message_is_scrubbed() {
        let scrubbed = VorionError::sanitized_message("invalid api_token=abc123");
        assert_eq!(scrubbed, "internal error (details withheld)");
    }

    #[test]
    fn benign_message_passes_through() {
        let message = VorionError::sanitized_message("agent not found");
        assert_eq!(message, "agent not found");
    }

    #[test]
    fn envelope_hides_message_in_production() {
        let error = VorionError::Internal("leaked secret=xyz".into());
        let envelope =
            ErrorEnvelope::from_error(&error, "req-1".into(), 0, None, true);
        assert_eq!(envelope.error.message, "internal error (details withheld)");
    }
}
