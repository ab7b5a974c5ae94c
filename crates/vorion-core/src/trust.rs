// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The trust kernel — single source of truth for score, tier, role-gate,
//! context binding, and creation facts. All writes pass through
//! [`TrustKernel`]; nothing downstream is allowed to mutate an entity's
//! trust state directly.
//!
//! * [`TrustKernel::apply_score_delta`] — ceiling-enforced score mutation
//! * [`TrustKernel::tier_of`]           — pure tier derivation
//! * [`TrustKernel::check_role_tier`]   — `ROLE_GATE_MATRIX` lookup
//! * [`TrustKernel::create_agent_context`] / [`verify_context_integrity`](TrustKernel::verify_context_integrity)
//!   / [`validate_operation_in_context`](TrustKernel::validate_operation_in_context)
//! * [`TrustKernel::seal_creation_info`] / [`TrustKernel::migrate`]

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::VorionError;
use crate::storage::Storage;
use crate::types::{
    ContextBinding, ContextBindingType, CreationInfo, CreationType, TrustScore, TrustTier,
};

/// Severity of a [`TrustAuditEvent`], mirroring the severities the
/// std-layer audit pipeline (`vorion-audit`) records against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustAuditSeverity {
    Info,
    Warning,
    Critical,
}

/// A trust-kernel-originated event worth an audit record. Carries enough
/// to build one without the receiver needing to re-derive context this
/// crate already has in hand.
#[derive(Debug, Clone)]
pub struct TrustAuditEvent {
    pub entity_id: String,
    pub event_type: &'static str,
    pub severity: TrustAuditSeverity,
    pub detail: String,
}

/// Implemented by the std-layer audit pipeline and injected into
/// [`TrustKernel::with_audit_hook`]. Kept as a trait here, rather than
/// taking a concrete `vorion-audit` dependency, so the kernel stays
/// `no_std` — `vorion-audit` needs `tokio` and a filesystem-capable
/// persistence backend this crate never touches.
pub trait TrustAuditHook: Send + Sync {
    fn record(&self, event: TrustAuditEvent);
}

// ---------------------------------------------------------------------------
// Fixed tables
// ---------------------------------------------------------------------------

/// Score adjustment applied at instantiation, indexed by [`CreationType`].
/// FRESH 0, CLONED -50, EVOLVED +25, PROMOTED +50, IMPORTED -100.
pub const CREATION_MODIFIERS: [(CreationType, i64); 5] = [
    (CreationType::Fresh, 0),
    (CreationType::Cloned, -50),
    (CreationType::Evolved, 25),
    (CreationType::Promoted, 50),
    (CreationType::Imported, -100),
];

/// Score adjustment for a given [`CreationType`] per [`CREATION_MODIFIERS`].
pub fn modifier_for(creation_type: CreationType) -> i64 {
    CREATION_MODIFIERS
        .iter()
        .find(|(kind, _)| *kind == creation_type)
        .map(|(_, modifier)| *modifier)
        .unwrap_or(0)
}

/// 9 roles (R-L0..R-L8) x 6 tiers (T0..T5). `true` means the role is
/// permitted to operate at that tier. Read-only after load; a deployment
/// that needs a different matrix constructs one and swaps it in atomically
/// at the call site, never mutates this constant.
///
/// The general shape: lower autonomy roles (observers, monitors) are
/// permitted at every tier since they cannot act; higher autonomy roles
/// require a correspondingly higher trust tier before they are allowed to
/// operate at all.
pub const ROLE_GATE_MATRIX: [[bool; 6]; 9] = [
    // T0     T1     T2     T3     T4     T5
    [true, true, true, true, true, true],     // R-L0
    [true, true, true, true, true, true],     // R-L1
    [false, true, true, true, true, true],    // R-L2
    [false, true, true, true, true, true],    // R-L3
    [false, false, true, true, true, true],   // R-L4
    [false, false, true, true, true, true],   // R-L5
    [false, false, false, true, true, true],  // R-L6
    [false, false, false, false, true, true], // R-L7
    [false, false, false, false, false, true], // R-L8
];

/// Tier ceiling associated with each [`ContextBindingType`], used when
/// sealing a new context binding. LOCAL scopes agents to the lowest tier
/// ceiling; SOVEREIGN permits the full range.
fn ceiling_for_binding(binding_type: ContextBindingType) -> TrustTier {
    match binding_type {
        ContextBindingType::Local => TrustTier::T2,
        ContextBindingType::Enterprise => TrustTier::T4,
        ContextBindingType::Sovereign => TrustTier::T5,
    }
}

/// Derive a [`TrustTier`] from an effective score via the fixed bands:
/// 0-166 T0, 167-332 T1, 333-499 T2, 500-665 T3, 666-832 T4, 833-1000 T5.
///
/// Pure function — no I/O, no kernel state. Satisfies spec property P2:
/// `tier(s1) <= tier(s2)` whenever `s1 <= s2`.
pub fn tier_of(effective: i64) -> TrustTier {
    match effective {
        i64::MIN..=166 => TrustTier::T0,
        167..=332 => TrustTier::T1,
        333..=499 => TrustTier::T2,
        500..=665 => TrustTier::T3,
        666..=832 => TrustTier::T4,
        _ => TrustTier::T5,
    }
}

/// Clamp a raw score to the 1000-point ceiling. `effective` is always in
/// `[0, 1000]`; `raw` passes through unbounded. Satisfies spec property P1.
fn clamp_score(raw: i64) -> TrustScore {
    TrustScore {
        raw,
        effective: raw.clamp(0, 1000),
    }
}

// ---------------------------------------------------------------------------
// Trust kernel
// ---------------------------------------------------------------------------

/// Result of [`TrustKernel::apply_score_delta`].
#[derive(Debug, Clone, Copy)]
pub struct ScoreUpdateOutcome {
    pub score: TrustScore,
    pub tier: TrustTier,
    /// `true` when clamping actually changed the value that would
    /// otherwise have been persisted (i.e. `raw` fell outside `[0, 1000]`).
    /// Callers must audit this at warning severity when `raw > 1000` and at
    /// least info severity otherwise, per spec §4.3.
    pub clamped: bool,
}

/// Single source of truth for score, tier, role-gate, context, and
/// creation facts for every entity under governance.
pub struct TrustKernel<S: Storage> {
    storage: S,
    audit_hook: Option<Arc<dyn TrustAuditHook>>,
}

impl<S: Storage> TrustKernel<S> {
    pub fn new(storage: S) -> Self {
        Self { storage, audit_hook: None }
    }

    /// Attach an audit sink. The std layer (`vorion-engine`) supplies a
    /// bridge that forwards into its `AuditSink`; without one, kernel
    /// events that would otherwise be audited are simply dropped.
    pub fn with_audit_hook(mut self, hook: Arc<dyn TrustAuditHook>) -> Self {
        self.audit_hook = Some(hook);
        self
    }

    fn audit(&self, event: TrustAuditEvent) {
        if let Some(hook) = &self.audit_hook {
            hook.record(event);
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // -----------------------------------------------------------------
    // Ceiling enforcement
    // -----------------------------------------------------------------

    /// Apply a raw score delta (e.g. a trust signal's `impact`) to an
    /// entity's current raw score, clamp the result, and persist both
    /// `raw` and `effective`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vorion_core::{trust::TrustKernel, storage::InMemoryStorage};
    ///
    /// let mut kernel = TrustKernel::new(InMemoryStorage::new());
    /// let outcome = kernel.apply_score_delta("agent-1", 600);
    /// assert_eq!(outcome.score.effective, 600);
    /// assert!(!outcome.clamped);
    ///
    /// let outcome = kernel.apply_score_delta("agent-1", 500);
    /// assert_eq!(outcome.score.raw, 1100);
    /// assert_eq!(outcome.score.effective, 1000);
    /// assert!(outcome.clamped);
    /// ```
    pub fn apply_score_delta(&mut self, entity_id: &str, delta: i64) -> ScoreUpdateOutcome {
        let previous_raw = self
            .storage
            .get_trust_score(entity_id)
            .map(|score| score.raw)
            .unwrap_or(0);
        let raw = previous_raw.saturating_add(delta);
        self.set_raw_score(entity_id, raw)
    }

    /// Set an entity's raw score directly (used by [`Self::seal_creation_info`]
    /// for the initial baseline+modifier score, and available for direct
    /// administrative overrides).
    pub fn set_raw_score(&mut self, entity_id: &str, raw: i64) -> ScoreUpdateOutcome {
        let score = clamp_score(raw);
        let clamped = score.raw != score.effective;
        self.storage.set_trust_score(entity_id, score);

        if clamped {
            #[cfg(feature = "std")]
            if raw > 1000 {
                tracing::warn!(entity_id, raw, effective = score.effective, "trust score ceiling exceeded");
            } else {
                tracing::info!(entity_id, raw, effective = score.effective, "trust score floor exceeded");
            }
            self.audit(TrustAuditEvent {
                entity_id: entity_id.to_string(),
                event_type: "trust.score_clamped",
                severity: if raw > 1000 { TrustAuditSeverity::Warning } else { TrustAuditSeverity::Info },
                detail: format!("raw={} effective={}", raw, score.effective),
            });
        }

        ScoreUpdateOutcome {
            score,
            tier: tier_of(score.effective),
            clamped,
        }
    }

    /// Current trust score for an entity, defaulting to a zeroed score if
    /// none has ever been recorded.
    pub fn current_score(&self, entity_id: &str) -> TrustScore {
        self.storage
            .get_trust_score(entity_id)
            .unwrap_or(TrustScore { raw: 0, effective: 0 })
    }

    /// Current trust tier for an entity, derived from [`Self::current_score`].
    pub fn current_tier(&self, entity_id: &str) -> TrustTier {
        tier_of(self.current_score(entity_id).effective)
    }

    // -----------------------------------------------------------------
    // Role / tier gate
    // -----------------------------------------------------------------

    /// Kernel-layer (role, tier) gate: O(1) lookup against
    /// [`ROLE_GATE_MATRIX`]. This is the fail-fast layer; the policy layer
    /// (`BasisPolicyEngine` in [`crate::policy`]) applies exceptions and
    /// deployment-specific rules on top.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vorion_core::trust::check_role_tier;
    /// use vorion_core::types::{AgentRole, TrustTier};
    ///
    /// assert!(check_role_tier(AgentRole::RL0, TrustTier::T0));
    /// assert!(!check_role_tier(AgentRole::RL8, TrustTier::T0));
    /// ```
    pub fn check_role_tier(role: crate::types::AgentRole, tier: TrustTier) -> bool {
        check_role_tier(role, tier)
    }

    // -----------------------------------------------------------------
    // Context binding
    // -----------------------------------------------------------------

    /// Produce a sealed [`ContextBinding`] with an integrity hash over
    /// `{tenant, type, tier_ceiling, created_at}`.
    pub fn create_agent_context(
        &self,
        tenant_id: &str,
        binding_type: ContextBindingType,
        created_at_ms: u64,
    ) -> ContextBinding {
        let max_tier = ceiling_for_binding(binding_type);
        let integrity_hash = binding_integrity_hash(tenant_id, binding_type, max_tier, created_at_ms);
        ContextBinding {
            binding_type,
            tenant_id: tenant_id.into(),
            max_tier,
            integrity_hash,
            sealed_at_ms: created_at_ms,
        }
    }

    /// Recompute the integrity hash over a binding's sealed fields and
    /// compare against the stored hash. A mismatch is a critical,
    /// structural error — it means the binding was tampered with after
    /// sealing, which should never happen via any code path this crate
    /// exposes.
    pub fn verify_context_integrity(&self, binding: &ContextBinding) -> Result<(), VorionError> {
        let expected = binding_integrity_hash(
            &binding.tenant_id,
            binding.binding_type,
            binding.max_tier,
            binding.sealed_at_ms,
        );
        if expected == binding.integrity_hash {
            Ok(())
        } else {
            self.audit(TrustAuditEvent {
                entity_id: binding.tenant_id.clone(),
                event_type: "trust.context_integrity_violation",
                severity: TrustAuditSeverity::Critical,
                detail: "context binding integrity hash mismatch".to_string(),
            });
            Err(VorionError::IntegrityViolation(
                "context binding integrity hash mismatch".to_string(),
            ))
        }
    }

    /// Enforce the context hierarchy (`LOCAL < ENTERPRISE < SOVEREIGN`,
    /// a narrower operation is permitted under a broader binding) and
    /// reject cross-tenant access unconditionally, regardless of tier.
    pub fn validate_operation_in_context(
        &self,
        current: &ContextBinding,
        requested: &ContextBinding,
    ) -> Result<(), VorionError> {
        if current.tenant_id != requested.tenant_id {
            return Err(VorionError::Forbidden("TENANT_MISMATCH".to_string()));
        }
        if requested.binding_type > current.binding_type {
            return Err(VorionError::Forbidden(format!(
                "operation requires {:?} context but entity is bound to {:?}",
                requested.binding_type, current.binding_type
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Creation modifiers
    // -----------------------------------------------------------------

    /// Seal [`CreationInfo`] for a brand-new entity and set its initial
    /// effective score to `clamp(baseline + modifier)`.
    pub fn seal_creation_info(
        &mut self,
        entity_id: &str,
        creation_type: CreationType,
        parent_id: Option<String>,
        baseline: i64,
        created_at_ms: u64,
    ) -> (CreationInfo, ScoreUpdateOutcome) {
        let modifier = modifier_for(creation_type);
        let integrity_hash =
            creation_integrity_hash(entity_id, creation_type, parent_id.as_deref(), created_at_ms, modifier);
        let info = CreationInfo {
            creation_type,
            parent_id,
            created_at_ms,
            modifier,
            integrity_hash,
        };
        self.storage.set_creation_info(entity_id, info.clone());
        let outcome = self.set_raw_score(entity_id, baseline + modifier);
        (info, outcome)
    }

    /// Recompute and compare a [`CreationInfo`]'s integrity hash for a
    /// given entity.
    pub fn verify_creation_integrity(&self, entity_id: &str, info: &CreationInfo) -> Result<(), VorionError> {
        let expected = creation_integrity_hash(
            entity_id,
            info.creation_type,
            info.parent_id.as_deref(),
            info.created_at_ms,
            info.modifier,
        );
        if expected == info.integrity_hash {
            Ok(())
        } else {
            Err(VorionError::IntegrityViolation(
                "creation info integrity hash mismatch".to_string(),
            ))
        }
    }

    /// A change in creation type requires a new agent identity. This
    /// produces a fresh sealed [`CreationInfo`] under `new_entity_id` and
    /// records a migration linking `old_entity_id -> new_entity_id`; the
    /// old identity's own creation info is left untouched (it is sealed
    /// and immutable by construction).
    pub fn migrate(
        &mut self,
        old_entity_id: &str,
        new_entity_id: &str,
        new_creation_type: CreationType,
        baseline: i64,
        created_at_ms: u64,
        reason: &str,
    ) -> (CreationInfo, ScoreUpdateOutcome) {
        let (info, outcome) = self.seal_creation_info(
            new_entity_id,
            new_creation_type,
            Some(old_entity_id.to_string()),
            baseline,
            created_at_ms,
        );
        self.storage.record_migration(old_entity_id, new_entity_id, reason);
        self.audit(TrustAuditEvent {
            entity_id: new_entity_id.to_string(),
            event_type: "trust.identity_migrated",
            severity: TrustAuditSeverity::Info,
            detail: format!("{} -> {}: {}", old_entity_id, new_entity_id, reason),
        });
        (info, outcome)
    }
}

/// Free function form of [`TrustKernel::check_role_tier`], usable without a
/// kernel instance (e.g. from the validator, before an entity is loaded).
pub fn check_role_tier(role: crate::types::AgentRole, tier: TrustTier) -> bool {
    ROLE_GATE_MATRIX[role.index()][tier.index()]
}

fn binding_integrity_hash(
    tenant_id: &str,
    binding_type: ContextBindingType,
    max_tier: TrustTier,
    created_at_ms: u64,
) -> String {
    let payload = format!(
        "{}:{:?}:{:?}:{}",
        tenant_id, binding_type, max_tier, created_at_ms
    );
    hex_sha256(payload.as_bytes())
}

fn creation_integrity_hash(
    entity_id: &str,
    creation_type: CreationType,
    parent_id: Option<&str>,
    created_at_ms: u64,
    modifier: i64,
) -> String {
    let payload = format!(
        "{}:{:?}:{}:{}:{}",
        entity_id,
        creation_type,
        parent_id.unwrap_or(""),
        created_at_ms,
        modifier
    );
    hex_sha256(payload.as_bytes())
}

fn hex_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
