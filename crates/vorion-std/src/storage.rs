// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! File-based JSON storage backend.
//!
//! [`FileStorage`] persists all kernel state — trust scores, context
//! bindings, creation info, migrations, and the basis policy set — to a
//! single JSON file on disk. Every mutation flushes the file atomically
//! (write-rename) so a crash mid-write never corrupts existing data.
//!
//! ## Caveats
//!
//! * [`FileStorage`] holds the full in-memory state and flushes on every
//!   mutation. It is not intended for high-frequency write workloads —
//!   see [`vorion_core::config::Config::constraint_timeout_ms`]'s
//!   neighboring latency budgets for why the decision hot path should not
//!   touch this backend directly.
//! * Concurrent access from multiple processes is not supported.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use vorion_core::policy::Policy;
use vorion_core::storage::{MigrationRecord, Storage};
use vorion_core::types::{ContextBinding, CreationInfo, TrustScore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageSnapshot {
    trust: HashMap<String, TrustScore>,
    bindings: HashMap<String, ContextBinding>,
    creation: HashMap<String, CreationInfo>,
    migrations: Vec<MigrationRecordSnapshot>,
    policies: Vec<Policy>,
}

/// [`MigrationRecord`] does not derive `Serialize`/`Deserialize` in
/// `vorion-core` (it stays `no_std` + `alloc`-only there); this crate's
/// snapshot format mirrors its fields directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MigrationRecordSnapshot {
    old_entity_id: String,
    new_entity_id: String,
    reason: String,
}

/// A file-backed [`Storage`] implementation that persists state as JSON.
///
/// # Examples
///
/// ```rust,no_run
/// use vorion_std::storage::FileStorage;
/// use vorion_core::storage::Storage;
/// use vorion_core::types::TrustScore;
///
/// let mut storage = FileStorage::open("/tmp/vorion.json").expect("could not open storage");
/// storage.set_trust_score("agent-001", TrustScore { raw: 500, effective: 500 });
/// assert_eq!(storage.get_trust_score("agent-001").unwrap().effective, 500);
/// ```
pub struct FileStorage {
    path: PathBuf,
    data: StorageSnapshot,
}

impl FileStorage {
    /// Open an existing JSON storage file, or create a new empty one if
    /// the path does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(|error| {
                io::Error::new(io::ErrorKind::InvalidData, format!("storage JSON parse error: {error}"))
            })?
        } else {
            StorageSnapshot::default()
        };
        Ok(Self { path, data })
    }

    /// Flush the current in-memory state to disk using an atomic
    /// write-rename: written to `<path>.tmp` first, then renamed over the
    /// target, so a crash during the write never leaves a partial file.
    pub fn flush(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.data).map_err(|error| {
            io::Error::new(io::ErrorKind::InvalidData, format!("storage serialization error: {error}"))
        })?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Persist a policy snapshot taken from a [`vorion_core::policy::BasisPolicyEngine`].
    pub fn save_policies(&mut self, policies: Vec<Policy>) -> io::Result<()> {
        self.data.policies = policies;
        self.flush()
    }

    /// The policy snapshot last saved, to restore into a fresh
    /// `BasisPolicyEngine` on startup.
    pub fn load_policies(&self) -> Vec<Policy> {
        self.data.policies.clone()
    }
}

impl Storage for FileStorage {
    fn get_trust_score(&self, entity_id: &str) -> Option<TrustScore> {
        self.data.trust.get(entity_id).copied()
    }

    fn set_trust_score(&mut self, entity_id: &str, score: TrustScore) {
        self.data.trust.insert(entity_id.to_string(), score);
        if let Err(error) = self.flush() {
            tracing::error!(entity_id, %error, "failed to flush trust score to disk");
        }
    }

    fn get_context_binding(&self, entity_id: &str) -> Option<ContextBinding> {
        self.data.bindings.get(entity_id).cloned()
    }

    fn set_context_binding(&mut self, entity_id: &str, binding: ContextBinding) {
        self.data.bindings.insert(entity_id.to_string(), binding);
        if let Err(error) = self.flush() {
            tracing::error!(entity_id, %error, "failed to flush context binding to disk");
        }
    }

    fn get_creation_info(&self, entity_id: &str) -> Option<CreationInfo> {
        self.data.creation.get(entity_id).cloned()
    }

    fn set_creation_info(&mut self, entity_id: &str, info: CreationInfo) {
        self.data.creation.insert(entity_id.to_string(), info);
        if let Err(error) = self.flush() {
            tracing::error!(entity_id, %error, "failed to flush creation info to disk");
        }
    }

    fn record_migration(&mut self, old_entity_id: &str, new_entity_id: &str, reason: &str) {
        self.data.migrations.push(MigrationRecordSnapshot {
            old_entity_id: old_entity_id.to_string(),
            new_entity_id: new_entity_id.to_string(),
            reason: reason.to_string(),
        });
        if let Err(error) = self.flush() {
            tracing::error!(old_entity_id, new_entity_id, %error, "failed to flush migration record to disk");
        }
    }

    fn migrations(&self) -> Vec<MigrationRecord> {
        self.data
            .migrations
            .iter()
            .map(|record| MigrationRecord {
                old_entity_id: record.old_entity_id.clone(),
                new_entity_id: record.new_entity_id.clone(),
                reason: record.reason.clone(),
            })
            .collect()
    }
}
