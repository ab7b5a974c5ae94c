// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Shared data types used across every Vorion decision-core crate.
//!
//! All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so they can be serialised to JSON, cached, audited,
//! and snapshotted without additional conversion steps.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// The request under evaluation by the enforcement engine.
///
/// Immutable once admitted. The `context` map is an opaque string-to-JSON
/// blob — internal code never introspects it except via the fixed,
/// documented keys each component needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Stable identifier for this intent (UUID).
    pub id: String,
    /// Identifier of the tenant on whose behalf the action is requested.
    pub tenant_id: String,
    /// Identifier of the agent requesting the action.
    pub entity_id: String,
    /// Short enum-like tag, e.g. `"data.read"`.
    pub intent_type: String,
    /// Free-form description of what the agent is trying to accomplish.
    pub goal: String,
    /// Opaque context map; canonicalised (sorted keys) for fingerprinting.
    pub context: BTreeMap<String, Value>,
    /// Relative priority, higher is more urgent. Unitless.
    pub priority: i32,
    /// Unix epoch milliseconds at which the intent was created.
    pub created_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Entity / Agent
// ---------------------------------------------------------------------------

/// The kind of principal an [`Entity`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Agent,
    User,
    Service,
    System,
}

/// Nine-level autonomy role, paired with [`TrustTier`] via
/// [`crate::trust::ROLE_GATE_MATRIX`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    RL0 = 0,
    RL1 = 1,
    RL2 = 2,
    RL3 = 3,
    RL4 = 4,
    RL5 = 5,
    RL6 = 6,
    RL7 = 7,
    RL8 = 8,
}

impl AgentRole {
    /// All nine roles in ascending autonomy order.
    pub const ALL: [AgentRole; 9] = [
        AgentRole::RL0,
        AgentRole::RL1,
        AgentRole::RL2,
        AgentRole::RL3,
        AgentRole::RL4,
        AgentRole::RL5,
        AgentRole::RL6,
        AgentRole::RL7,
        AgentRole::RL8,
    ];

    /// Human-readable label, e.g. `"R-L5"`.
    pub fn display_name(self) -> &'static str {
        match self {
            AgentRole::RL0 => "R-L0",
            AgentRole::RL1 => "R-L1",
            AgentRole::RL2 => "R-L2",
            AgentRole::RL3 => "R-L3",
            AgentRole::RL4 => "R-L4",
            AgentRole::RL5 => "R-L5",
            AgentRole::RL6 => "R-L6",
            AgentRole::RL7 => "R-L7",
            AgentRole::RL8 => "R-L8",
        }
    }

    /// Row index into [`crate::trust::ROLE_GATE_MATRIX`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// An AI agent, user, service, or system principal under governance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier for this entity.
    pub id: String,
    /// Kind of principal this entity represents.
    pub entity_type: EntityType,
    /// Current trust score, both raw and effective.
    pub trust_score: TrustScore,
    /// Current trust tier, derived from `trust_score.effective`.
    pub trust_tier: TrustTier,
    /// Autonomy role, gated against `trust_tier` via the role-gate matrix.
    pub role: AgentRole,
    /// Sealed scope under which this entity operates for its entire
    /// lifetime.
    pub context_binding: ContextBinding,
    /// Sealed record of how this entity identity came to exist.
    pub creation_info: CreationInfo,
}

// ---------------------------------------------------------------------------
// Trust
// ---------------------------------------------------------------------------

/// Trust score with both the raw (unbounded, analytics) and effective
/// (clamped to `[0, 1000]`, policy input) values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Pre-clamp value. Unbounded; kept for analytics.
    pub raw: i64,
    /// Post-clamp value in `[0, 1000]`. The only value policy may use.
    pub effective: i64,
}

/// Six-band trust posture derived from [`TrustScore::effective`].
///
/// Bands: T0 0–166, T1 167–332, T2 333–499, T3 500–665, T4 666–832,
/// T5 833–1000.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrustTier {
    T0 = 0,
    T1 = 1,
    T2 = 2,
    T3 = 3,
    T4 = 4,
    T5 = 5,
}

impl TrustTier {
    /// Column index into [`crate::trust::ROLE_GATE_MATRIX`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label, e.g. `"T3"`.
    pub fn display_name(self) -> &'static str {
        match self {
            TrustTier::T0 => "T0",
            TrustTier::T1 => "T1",
            TrustTier::T2 => "T2",
            TrustTier::T3 => "T3",
            TrustTier::T4 => "T4",
            TrustTier::T5 => "T5",
        }
    }
}

/// Origin of an agent identity. Permanently baked into [`CreationInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationType {
    Fresh,
    Cloned,
    Evolved,
    Promoted,
    Imported,
}

/// Sealed, create-once record of how an agent identity came to exist.
///
/// Any attempt to change a field after construction must instead produce a
/// new agent identity plus a migration audit entry linking old to new —
/// see [`crate::trust::TrustKernel::migrate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationInfo {
    pub creation_type: CreationType,
    pub parent_id: Option<String>,
    pub created_at_ms: u64,
    /// Score adjustment applied at instantiation, per
    /// [`crate::trust::CREATION_MODIFIERS`].
    pub modifier: i64,
    /// Hash over the sealed fields, recomputed on every integrity check.
    pub integrity_hash: String,
}

/// The sealed scope under which an entity operates for its entire lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextBindingType {
    Local,
    Enterprise,
    Sovereign,
}

/// Sealed record of the tenant scope and tier ceiling an entity was created
/// under. Frozen after creation; [`crate::trust::TrustKernel::verify_context_integrity`]
/// recomputes the hash on read to detect tampering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBinding {
    pub binding_type: ContextBindingType,
    pub tenant_id: String,
    pub max_tier: TrustTier,
    pub integrity_hash: String,
    pub sealed_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Constraints, decisions, and control actions
// ---------------------------------------------------------------------------

/// The final output of a decision. Ordered by restrictiveness per the fixed
/// priority table `deny < terminate < escalate < limit < monitor < allow`
/// (lower variant = more restrictive = wins ties in
/// [`crate::policy::most_restrictive`]).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Deny = 0,
    Terminate = 1,
    Escalate = 2,
    Limit = 3,
    Monitor = 4,
    Allow = 5,
}

impl ControlAction {
    /// Human-readable label matching the `snake_case` wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlAction::Allow => "allow",
            ControlAction::Deny => "deny",
            ControlAction::Limit => "limit",
            ControlAction::Monitor => "monitor",
            ControlAction::Escalate => "escalate",
            ControlAction::Terminate => "terminate",
        }
    }
}

/// The kind of check a [`ConstraintResult`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    TrustLevel,
    PolicyRule,
    RateLimit,
    TimeWindow,
    GeoRestriction,
    Custom,
}

/// Outcome of a single constraint evaluated during enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub constraint_id: String,
    pub kind: ConstraintKind,
    pub passed: bool,
    pub action: ControlAction,
    pub reason: String,
    pub details: BTreeMap<String, Value>,
    pub duration_ms: f64,
}

/// `pending -> {approved, rejected, timeout, cancelled}`. The only mutation
/// permitted on a [`Decision`] is an escalation state transition, and every
/// transition must write an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Pending,
    Approved,
    Rejected,
    Timeout,
    Cancelled,
}

impl EscalationStatus {
    /// Whether `self -> next` is a legal state-machine transition.
    ///
    /// All four terminal states are reachable only from `Pending`; once
    /// terminal, no further transition is legal.
    pub fn can_transition_to(self, next: EscalationStatus) -> bool {
        matches!(self, EscalationStatus::Pending) && !matches!(next, EscalationStatus::Pending)
    }
}

/// A decision deferred to a human or external approver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub id: String,
    pub intent_id: String,
    pub reason: String,
    pub escalate_to: String,
    pub timeout_ms: u64,
    pub status: EscalationStatus,
    pub created_at_ms: u64,
}

/// Audit-ready record of a single escalation state change, returned by
/// [`EscalationRecord::transition`] so the caller can log it without
/// re-deriving the before/after states itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationTransition {
    pub escalation_id: String,
    pub from: EscalationStatus,
    pub to: EscalationStatus,
    pub at_ms: u64,
}

impl EscalationRecord {
    /// The only mutator on an [`EscalationRecord`]. Rejects any transition
    /// [`EscalationStatus::can_transition_to`] disallows; on success,
    /// updates `status` in place and returns the transition for the caller
    /// to audit.
    pub fn transition(
        &mut self,
        next: EscalationStatus,
        at_ms: u64,
    ) -> Result<EscalationTransition, EscalationStatus> {
        if !self.status.can_transition_to(next) {
            return Err(self.status);
        }
        let from = self.status;
        self.status = next;
        Ok(EscalationTransition {
            escalation_id: self.id.clone(),
            from,
            to: next,
            at_ms,
        })
    }
}

/// Immutable record of a single enforcement decision.
///
/// References the exact policy version and rule checksums used to produce
/// it (via `policies_evaluated`), so replay can reconstruct the same
/// evaluation deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub intent_id: String,
    pub tenant_id: String,
    pub final_action: ControlAction,
    pub reason: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    pub constraints: Vec<ConstraintResult>,
    pub policies_evaluated: Vec<PolicyReference>,
    pub trust_score: TrustScore,
    pub trust_tier: TrustTier,
    pub decided_at_ms: u64,
    pub duration_ms: f64,
    pub cached: bool,
    pub escalation: Option<EscalationRecord>,
    pub trace_id: String,
    pub span_id: String,
}

/// Identifies the exact policy version + rule checksum set a [`Decision`]
/// was evaluated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyReference {
    pub policy_id: String,
    pub namespace: String,
    pub version: u64,
    pub checksum: String,
}
