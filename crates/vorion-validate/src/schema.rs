// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Structural schema checking: field presence and JSON-type matching for
//! request bodies, query parameters, and path segments. Not a general JSON
//! Schema implementation — this only needs to catch "required field
//! missing" and "field is the wrong type" before anything downstream
//! assumes a shape that isn't there, so a flat, declarative field list is
//! enough.

use serde_json::Value;

/// The JSON type a [`FieldSpec`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Bool,
    Object,
    Array,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Bool => "bool",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
        }
    }
}

/// A single field's expected shape within a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(kind: FieldKind) -> Self {
        Self { kind, required: true }
    }

    pub fn optional(kind: FieldKind) -> Self {
        Self { kind, required: false }
    }
}

/// The first field a [`Schema::check`] found wrong, if any.
#[derive(Debug, Clone)]
pub struct SchemaMismatch {
    pub field: String,
    pub expected: String,
    pub received: String,
    pub missing: bool,
}

/// A flat, top-level field schema for a JSON object. Fields not declared
/// here are ignored rather than rejected — this validates shape, it does
/// not enforce a closed field set.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    /// Check `value` against every declared field, stopping at the first
    /// mismatch. `value` itself must be a JSON object, or the check fails
    /// immediately against the empty field path.
    pub fn check(&self, value: &Value) -> Option<SchemaMismatch> {
        let Value::Object(map) = value else {
            return Some(SchemaMismatch {
                field: String::new(),
                expected: "object".into(),
                received: json_type_name(value).into(),
                missing: false,
            });
        };

        for (name, spec) in &self.fields {
            match map.get(name) {
                Some(field_value) if !spec.kind.matches(field_value) => {
                    return Some(SchemaMismatch {
                        field: name.clone(),
                        expected: spec.kind.as_str().into(),
                        received: json_type_name(field_value).into(),
                        missing: false,
                    });
                }
                Some(_) => {}
                None if spec.required => {
                    return Some(SchemaMismatch {
                        field: name.clone(),
                        expected: format!("required {} field", spec.kind.as_str()),
                        received: "missing".into(),
                        missing: true,
                    });
                }
                None => {}
            }
        }
        None
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .field("goal", FieldSpec::required(FieldKind::String))
            .field("priority", FieldSpec::optional(FieldKind::Number))
    }

    #[test]
    fn well_formed_value_passes() {
        assert!(schema().check(&json!({ "goal": "read a report", "priority": 3 })).is_none());
    }

    #[test]
    fn missing_required_field_is_flagged() {
        let mismatch = schema().check(&json!({ "priority": 3 })).unwrap();
        assert_eq!(mismatch.field, "goal");
        assert!(mismatch.missing);
    }

    #[test]
    fn wrong_type_is_flagged() {
        let mismatch = schema().check(&json!({ "goal": 123 })).unwrap();
        assert_eq!(mismatch.field, "goal");
        assert_eq!(mismatch.expected, "string");
        assert_eq!(mismatch.received, "number");
    }

    #[test]
    fn missing_optional_field_passes() {
        assert!(schema().check(&json!({ "goal": "ok" })).is_none());
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        assert!(schema().check(&json!({ "goal": "ok", "extra": true })).is_none());
    }

    #[test]
    fn non_object_value_fails() {
        let mismatch = schema().check(&json!("not an object")).unwrap();
        assert_eq!(mismatch.expected, "object");
    }
}
