// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The audit record and its hash-chain linkage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Severity of an audited event, independent of its [`AuditOutcome`] — a
/// successful operation can still be `Critical` (a cross-tenant attempt
/// that was correctly denied is still worth paging on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Whether the audited operation itself succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    Partial,
}

/// A not-yet-sequenced, not-yet-hashed audit entry. Built by a caller and
/// handed to [`crate::sink::AuditSink::enqueue`], which assigns the
/// sequence number, links it into the tenant's hash chain, and returns the
/// resulting [`AuditRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub tenant_id: String,
    pub event_type: String,
    pub severity: AuditSeverity,
    pub outcome: AuditOutcome,
    pub actor: String,
    pub target: String,
    pub action: String,
    pub reason: String,
    pub decision_id: Option<String>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub metadata: Value,
    pub event_time_ms: u64,
}

impl AuditEntry {
    /// Convenience constructor for the common case: no before/after state
    /// and empty metadata. Callers that need state diffs or metadata build
    /// the struct literal directly.
    pub fn new(
        tenant_id: impl Into<String>,
        event_type: impl Into<String>,
        severity: AuditSeverity,
        outcome: AuditOutcome,
        actor: impl Into<String>,
        target: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
        event_time_ms: u64,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            event_type: event_type.into(),
            severity,
            outcome,
            actor: actor.into(),
            target: target.into(),
            action: action.into(),
            reason: reason.into(),
            decision_id: None,
            before: None,
            after: None,
            metadata: Value::Null,
            event_time_ms,
        }
    }

    pub fn with_decision_id(mut self, decision_id: impl Into<String>) -> Self {
        self.decision_id = Some(decision_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_states(mut self, before: Option<Value>, after: Option<Value>) -> Self {
        self.before = before;
        self.after = after;
        self
    }
}

/// A single tamper-evident audit entry, sequenced and linked into its
/// tenant's hash chain.
///
/// `record_hash` is a SHA-256 digest over every other field plus
/// `previous_hash`, so altering any field or reordering records breaks the
/// chain for every subsequent entry in the same tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub tenant_id: String,
    pub event_type: String,
    pub severity: AuditSeverity,
    pub outcome: AuditOutcome,
    pub actor: String,
    pub target: String,
    pub action: String,
    pub reason: String,
    pub decision_id: Option<String>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub metadata: Value,
    pub event_time_ms: u64,
    pub sequence_number: u64,
    pub previous_hash: String,
    pub record_hash: String,
    pub recorded_at_ms: u64,
}

impl AuditRecord {
    /// Compute the record hash for a not-yet-hashed entry. Called once at
    /// construction; the result is stored in `record_hash` so it never
    /// needs recomputation except during chain verification.
    pub fn compute_hash(entry: &AuditEntry, sequence_number: u64, previous_hash: &str, recorded_at_ms: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(entry.tenant_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.event_type.as_bytes());
        hasher.update(b"\0");
        hasher.update([entry.severity as u8]);
        hasher.update([entry.outcome as u8]);
        hasher.update(entry.actor.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.target.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.action.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.reason.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.decision_id.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\0");
        hasher.update(
            entry
                .before
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_default()
                .as_bytes(),
        );
        hasher.update(b"\0");
        hasher.update(
            entry
                .after
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_default()
                .as_bytes(),
        );
        hasher.update(b"\0");
        hasher.update(entry.metadata.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.event_time_ms.to_le_bytes());
        hasher.update(sequence_number.to_le_bytes());
        hasher.update(previous_hash.as_bytes());
        hasher.update(recorded_at_ms.to_le_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(64);
        for byte in digest {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }

    /// Recompute this record's hash from its own fields and compare
    /// against the stored `record_hash`, detecting tampering.
    pub fn verify(&self) -> bool {
        let entry = AuditEntry {
            tenant_id: self.tenant_id.clone(),
            event_type: self.event_type.clone(),
            severity: self.severity,
            outcome: self.outcome,
            actor: self.actor.clone(),
            target: self.target.clone(),
            action: self.action.clone(),
            reason: self.reason.clone(),
            decision_id: self.decision_id.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            metadata: self.metadata.clone(),
            event_time_ms: self.event_time_ms,
        };
        let expected = Self::compute_hash(&entry, self.sequence_number, &self.previous_hash, self.recorded_at_ms);
        expected == self.record_hash
    }
}

/// The hash chain's genesis value for a tenant with no prior records.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> AuditEntry {
        AuditEntry::new(
            "t1",
            "decision.made",
            AuditSeverity::Info,
            AuditOutcome::Success,
            "agent-1",
            "resource-1",
            "allow",
            "policy matched",
            0,
        )
    }

    #[test]
    fn record_verifies_against_its_own_hash() {
        let entry = sample_entry();
        let hash = AuditRecord::compute_hash(&entry, 1, GENESIS_HASH, 0);
        let record = AuditRecord {
            id: "a1".into(),
            tenant_id: entry.tenant_id,
            event_type: entry.event_type,
            severity: entry.severity,
            outcome: entry.outcome,
            actor: entry.actor,
            target: entry.target,
            action: entry.action,
            reason: entry.reason,
            decision_id: entry.decision_id,
            before: entry.before,
            after: entry.after,
            metadata: entry.metadata,
            event_time_ms: entry.event_time_ms,
            sequence_number: 1,
            previous_hash: GENESIS_HASH.into(),
            record_hash: hash,
            recorded_at_ms: 0,
        };
        assert!(record.verify());
    }

    #[test]
    fn tampered_metadata_fails_verification() {
        let entry = sample_entry();
        let hash = AuditRecord::compute_hash(&entry, 1, GENESIS_HASH, 0);
        let mut record = AuditRecord {
            id: "a1".into(),
            tenant_id: entry.tenant_id,
            event_type: entry.event_type,
            severity: entry.severity,
            outcome: entry.outcome,
            actor: entry.actor,
            target: entry.target,
            action: entry.action,
            reason: entry.reason,
            decision_id: entry.decision_id,
            before: entry.before,
            after: entry.after,
            metadata: entry.metadata,
            event_time_ms: entry.event_time_ms,
            sequence_number: 1,
            previous_hash: GENESIS_HASH.into(),
            record_hash: hash,
            recorded_at_ms: 0,
        };
        record.metadata = serde_json::json!({"tampered": true});
        assert!(!record.verify());
    }

    #[test]
    fn tampered_outcome_fails_verification() {
        let entry = sample_entry();
        let hash = AuditRecord::compute_hash(&entry, 1, GENESIS_HASH, 0);
        let mut record = AuditRecord {
            id: "a1".into(),
            tenant_id: entry.tenant_id,
            event_type: entry.event_type,
            severity: entry.severity,
            outcome: entry.outcome,
            actor: entry.actor,
            target: entry.target,
            action: entry.action,
            reason: entry.reason,
            decision_id: entry.decision_id,
            before: entry.before,
            after: entry.after,
            metadata: entry.metadata,
            event_time_ms: entry.event_time_ms,
            sequence_number: 1,
            previous_hash: GENESIS_HASH.into(),
            record_hash: hash,
            recorded_at_ms: 0,
        };
        record.outcome = AuditOutcome::Failure;
        assert!(!record.verify());
    }
}
