// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Request validation for the Vorion decision core.
//!
//! [`Validator`] is the single entry point: `validate_body`, `validate_query`,
//! and `validate_path` each run the same pipeline — byte-budget check first
//! (cheapest, rejects oversized payloads before any parsing-adjacent work),
//! then an optional [`Schema`] shape check, then recursive string
//! sanitization, then an injection-pattern scan. Every rejection carries a
//! field path so a caller can point a user at the exact offending value.
//!
//! # Example
//!
//! ```rust
//! use vorion_validate::{FieldKind, FieldSpec, Schema, Validator};
//! use vorion_core::Config;
//! use serde_json::json;
//!
//! let validator = Validator::new(Config::default());
//! let schema = Schema::new().field("goal", FieldSpec::required(FieldKind::String));
//!
//! let body = json!({ "goal": "read the quarterly report" });
//! assert!(validator.validate_body(&body, Some(&schema)).is_ok());
//!
//! let malicious = json!({ "goal": "'; DROP TABLE agents; --" });
//! assert!(validator.validate_body(&malicious, Some(&schema)).is_err());
//!
//! let malformed = json!({ "priority": 3 });
//! assert!(validator.validate_body(&malformed, Some(&schema)).is_err());
//! ```

use serde_json::Value;

use vorion_core::Config;

mod sanitize;
mod scan;
mod schema;

pub use scan::InjectionKind;
pub use schema::{FieldKind, FieldSpec, Schema, SchemaMismatch};

/// The kind of mismatch a [`ValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    PayloadTooLarge,
    InjectionSuspected,
    InvalidType,
    Required,
}

/// A single validation failure, carrying enough context for a caller to
/// point a user at the exact offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dot-separated path to the offending field, e.g. `"context.query"`.
    pub path: String,
    pub code: ValidationCode,
    pub expected: String,
    pub received: String,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "validation failed at {}: expected {}, received {}",
            self.path, self.expected, self.received
        )
    }
}

impl std::error::Error for ValidationError {}

/// Validates and sanitizes intent bodies, query parameters, and path
/// segments before they reach the enforcement pipeline.
pub struct Validator {
    max_payload_bytes: usize,
}

impl Validator {
    pub fn new(config: Config) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
        }
    }

    /// Validate a JSON request body: size budget, then an optional
    /// [`Schema`] shape check, then a recursive sanitization + injection
    /// scan over every string leaf.
    pub fn validate_body(&self, body: &Value, schema: Option<&Schema>) -> Result<(), ValidationError> {
        self.check_size(body)?;
        self.check_schema("body", schema, body)?;
        self.scan_value("body", body)
    }

    /// Validate a flat query-parameter map.
    pub fn validate_query(&self, query: &[(String, String)], schema: Option<&Schema>) -> Result<(), ValidationError> {
        self.check_schema("query", schema, &pairs_to_object(query))?;
        for (key, value) in query {
            self.scan_string(&format!("query.{key}"), value)?;
        }
        Ok(())
    }

    /// Validate path segments (e.g. a tenant id or entity id extracted from
    /// a route).
    pub fn validate_path(
        &self,
        segments: &[(String, String)],
        schema: Option<&Schema>,
    ) -> Result<(), ValidationError> {
        self.check_schema("path", schema, &pairs_to_object(segments))?;
        for (name, value) in segments {
            self.scan_string(&format!("path.{name}"), value)?;
        }
        Ok(())
    }

    /// Sanitize a single string: strip control bytes, normalize whitespace.
    /// Exposed so callers can clean a value after validation passes rather
    /// than reject it outright.
    pub fn sanitize(&self, input: &str) -> String {
        sanitize::sanitize_string(input)
    }

    fn check_schema(&self, path: &str, schema: Option<&Schema>, value: &Value) -> Result<(), ValidationError> {
        let Some(schema) = schema else {
            return Ok(());
        };
        if let Some(mismatch) = schema.check(value) {
            let field_path = if mismatch.field.is_empty() {
                path.to_string()
            } else {
                format!("{path}.{}", mismatch.field)
            };
            return Err(ValidationError {
                path: field_path,
                code: if mismatch.missing { ValidationCode::Required } else { ValidationCode::InvalidType },
                expected: mismatch.expected,
                received: mismatch.received,
            });
        }
        Ok(())
    }

    fn check_size(&self, body: &Value) -> Result<(), ValidationError> {
        let size = serde_json::to_vec(body).map(|bytes| bytes.len()).unwrap_or(usize::MAX);
        if size > self.max_payload_bytes {
            return Err(ValidationError {
                path: "body".into(),
                code: ValidationCode::PayloadTooLarge,
                expected: format!("<= {} bytes", self.max_payload_bytes),
                received: format!("{size} bytes"),
            });
        }
        Ok(())
    }

    fn scan_value(&self, path: &str, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) => self.scan_string(path, s),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.scan_value(&format!("{path}[{index}]"), item)?;
                }
                Ok(())
            }
            Value::Object(map) => {
                for (key, item) in map {
                    self.scan_value(&format!("{path}.{key}"), item)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn scan_string(&self, path: &str, value: &str) -> Result<(), ValidationError> {
        if let Some(kind) = scan::scan_for_injection(value) {
            tracing::warn!(path, kind = kind.as_str(), "injection pattern rejected");
            return Err(ValidationError {
                path: path.to_string(),
                code: ValidationCode::InjectionSuspected,
                expected: "value free of injection patterns".into(),
                received: kind.as_str().into(),
            });
        }
        Ok(())
    }
}

fn pairs_to_object(pairs: &[(String, String)]) -> Value {
    Value::Object(pairs.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(Config::default())
    }

    #[test]
    fn benign_body_passes() {
        let body = json!({ "goal": "summarize last week's invoices", "priority": 3 });
        assert!(validator().validate_body(&body, None).is_ok());
    }

    #[test]
    fn oversized_body_is_rejected() {
        let mut config = Config::default();
        config.max_payload_bytes = 8;
        let validator = Validator::new(config);
        let body = json!({ "goal": "this is far too long for the configured budget" });
        let error = validator.validate_body(&body, None).unwrap_err();
        assert_eq!(error.code, ValidationCode::PayloadTooLarge);
    }

    #[test]
    fn nested_injection_is_found_with_path() {
        let body = json!({ "context": { "query": "1; DROP TABLE users" } });
        let error = validator().validate_body(&body, None).unwrap_err();
        assert_eq!(error.code, ValidationCode::InjectionSuspected);
        assert_eq!(error.path, "body.context.query");
    }

    #[test]
    fn query_params_are_scanned() {
        let query = vec![("redirect".to_string(), "<script>alert(1)</script>".to_string())];
        assert!(validator().validate_query(&query, None).is_err());
    }

    #[test]
    fn path_traversal_in_path_segment_is_rejected() {
        let segments = vec![("file".to_string(), "../../etc/passwd".to_string())];
        assert!(validator().validate_path(&segments, None).is_err());
    }

    #[test]
    fn schema_rejects_missing_required_field_before_scanning() {
        let schema = Schema::new().field("goal", FieldSpec::required(FieldKind::String));
        let body = json!({ "priority": 3 });
        let error = validator().validate_body(&body, Some(&schema)).unwrap_err();
        assert_eq!(error.code, ValidationCode::Required);
        assert_eq!(error.path, "body.goal");
    }

    #[test]
    fn schema_rejects_wrong_field_type() {
        let schema = Schema::new().field("priority", FieldSpec::required(FieldKind::Number));
        let body = json!({ "priority": "not a number" });
        let error = validator().validate_body(&body, Some(&schema)).unwrap_err();
        assert_eq!(error.code, ValidationCode::InvalidType);
    }

    #[test]
    fn schema_checked_query_rejects_missing_required_param() {
        let schema = Schema::new().field("tenant", FieldSpec::required(FieldKind::String));
        let query = vec![("other".to_string(), "x".to_string())];
        let error = validator().validate_query(&query, Some(&schema)).unwrap_err();
        assert_eq!(error.code, ValidationCode::Required);
    }

    #[test]
    fn schema_passing_body_still_runs_injection_scan() {
        let schema = Schema::new().field("goal", FieldSpec::required(FieldKind::String));
        let body = json!({ "goal": "'; DROP TABLE agents; --" });
        let error = validator().validate_body(&body, Some(&schema)).unwrap_err();
        assert_eq!(error.code, ValidationCode::InjectionSuspected);
    }
}
