// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Snapshot capture and restore.
//!
//! A [`Snapshot`] freezes every input a [`Decision`](vorion_core::types::Decision)
//! was computed from: the intent, a trust snapshot, frozen policy copies
//! (version + checksum), and the environment at decision time. Snapshots
//! are append-only — once captured, a [`SnapshotManager`] never mutates one.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use vorion_core::types::{Decision, Intent, PolicyReference, TrustScore, TrustTier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustSnapshot {
    pub score: TrustScore,
    pub tier: TrustTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub captured_at_ms: u64,
    pub timezone: String,
    pub request_id: String,
}

/// An immutable capture of one decision's inputs and output, keyed by
/// [`Snapshot::id`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub intent_id: String,
    pub tenant_id: String,
    pub intent: Intent,
    pub trust_snapshot: TrustSnapshot,
    pub policies: Vec<PolicyReference>,
    pub environment: EnvironmentSnapshot,
    pub decision: Decision,
    pub metadata: BTreeMap<String, Value>,
    pub captured_at_ms: u64,
}

/// Overrides applied when restoring a snapshot into a fresh evaluation
/// context, e.g. to replay "what if trust had been T1 instead".
#[derive(Debug, Clone, Default)]
pub struct RestoreOverrides {
    pub trust_snapshot: Option<TrustSnapshot>,
    pub environment: Option<EnvironmentSnapshot>,
}

/// A restored, read-only context equivalent to the one a snapshot was
/// captured from, modulo any [`RestoreOverrides`] applied.
#[derive(Debug, Clone)]
pub struct RestoredContext {
    pub intent: Intent,
    pub trust_snapshot: TrustSnapshot,
    pub policies: Vec<PolicyReference>,
    pub environment: EnvironmentSnapshot,
}

/// Append-only store of captured snapshots, keyed by id.
#[derive(Default)]
pub struct SnapshotManager {
    snapshots: HashMap<String, Snapshot>,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a snapshot of a just-produced decision and its inputs.
    pub fn capture(
        &mut self,
        intent: Intent,
        trust_snapshot: TrustSnapshot,
        policies: Vec<PolicyReference>,
        environment: EnvironmentSnapshot,
        decision: Decision,
        metadata: BTreeMap<String, Value>,
        captured_at_ms: u64,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let snapshot = Snapshot {
            id: id.clone(),
            intent_id: intent.id.clone(),
            tenant_id: intent.tenant_id.clone(),
            intent,
            trust_snapshot,
            policies,
            environment,
            decision,
            metadata,
            captured_at_ms,
        };
        self.snapshots.insert(id.clone(), snapshot);
        id
    }

    pub fn get(&self, snapshot_id: &str) -> Option<&Snapshot> {
        self.snapshots.get(snapshot_id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Restore a snapshot into a read-only evaluation context, applying any
    /// overrides. The original snapshot is never mutated.
    pub fn restore(&self, snapshot_id: &str, overrides: RestoreOverrides) -> Option<RestoredContext> {
        let snapshot = self.snapshots.get(snapshot_id)?;
        Some(RestoredContext {
            intent: snapshot.intent.clone(),
            trust_snapshot: overrides.trust_snapshot.unwrap_or_else(|| snapshot.trust_snapshot.clone()),
            policies: snapshot.policies.clone(),
            environment: overrides.environment.unwrap_or_else(|| snapshot.environment.clone()),
        })
    }
}
