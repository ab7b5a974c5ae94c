// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Storage abstraction for the trust kernel.
//!
//! The [`Storage`] trait is the single interface between [`crate::trust::TrustKernel`]
//! and any persistence layer. This crate ships [`InMemoryStorage`] for
//! development and testing; production backends (file-based, database,
//! etc.) live in downstream crates (`vorion-std`) so this crate stays
//! `no_std`-compatible.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::types::{ContextBinding, CreationInfo, TrustScore};

/// Pluggable persistence interface for entity trust state.
///
/// Implementations MUST be `Send + Sync` so the kernel can be shared across
/// threads when wrapped in `Arc<Mutex<...>>` or `Arc<RwLock<...>>` upstream.
pub trait Storage: Send + Sync {
    /// Retrieve the current trust score for an entity, if one has been
    /// recorded.
    fn get_trust_score(&self, entity_id: &str) -> Option<TrustScore>;

    /// Persist or overwrite the trust score for an entity.
    fn set_trust_score(&mut self, entity_id: &str, score: TrustScore);

    /// Retrieve the sealed context binding for an entity, if any.
    fn get_context_binding(&self, entity_id: &str) -> Option<ContextBinding>;

    /// Seal a context binding for an entity. Implementations must not allow
    /// silent overwrite of an existing sealed binding; callers enforce this
    /// at the kernel layer (see [`crate::trust::TrustKernel::create_agent_context`]).
    fn set_context_binding(&mut self, entity_id: &str, binding: ContextBinding);

    /// Retrieve the sealed creation info for an entity, if any.
    fn get_creation_info(&self, entity_id: &str) -> Option<CreationInfo>;

    /// Seal creation info for an entity.
    fn set_creation_info(&mut self, entity_id: &str, info: CreationInfo);

    /// Record a migration event linking an old agent identity to a new one,
    /// produced whenever a creation-type change forces a new identity.
    fn record_migration(&mut self, old_entity_id: &str, new_entity_id: &str, reason: &str);

    /// Return all migration records, oldest first. Used by tests and audit
    /// tooling; not on any decision hot path.
    fn migrations(&self) -> Vec<MigrationRecord>;
}

/// A single old-identity -> new-identity migration, produced by
/// [`crate::trust::TrustKernel::migrate`].
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub old_entity_id: String,
    pub new_entity_id: String,
    pub reason: String,
}

/// A volatile, heap-allocated [`Storage`] implementation backed by
/// [`hashbrown::HashMap`].
///
/// All data lives in process memory and is lost when the kernel is dropped.
/// Suitable for tests and any deployment where state is rebuilt from an
/// external source of truth on restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    scores: HashMap<String, TrustScore>,
    bindings: HashMap<String, ContextBinding>,
    creation: HashMap<String, CreationInfo>,
    migrations: Vec<MigrationRecord>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn get_trust_score(&self, entity_id: &str) -> Option<TrustScore> {
        self.scores.get(entity_id).copied()
    }

    fn set_trust_score(&mut self, entity_id: &str, score: TrustScore) {
        self.scores.insert(entity_id.into(), score);
    }

    fn get_context_binding(&self, entity_id: &str) -> Option<ContextBinding> {
        self.bindings.get(entity_id).cloned()
    }

    fn set_context_binding(&mut self, entity_id: &str, binding: ContextBinding) {
        self.bindings.insert(entity_id.into(), binding);
    }

    fn get_creation_info(&self, entity_id: &str) -> Option<CreationInfo> {
        self.creation.get(entity_id).cloned()
    }

    fn set_creation_info(&mut self, entity_id: &str, info: CreationInfo) {
        self.creation.insert(entity_id.into(), info);
    }

    fn record_migration(&mut self, old_entity_id: &str, new_entity_id: &str, reason: &str) {
        self.migrations.push(MigrationRecord {
            old_entity_id: old_entity_id.into(),
            new_entity_id: new_entity_id.into(),
            reason: reason.into(),
        });
    }

    fn migrations(&self) -> Vec<MigrationRecord> {
        self.migrations.clone()
    }
}
