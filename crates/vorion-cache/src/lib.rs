// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Two-tier decision cache for the Vorion decision core.
//!
//! [`DecisionCache`] checks the local tier first; on a local miss it
//! consults the (circuit-breaker-guarded) distributed tier and, on a hit
//! there, backfills the local tier. Writes go to both tiers. A corrupt
//! entry from the distributed tier (returned as an error from
//! [`shared::SharedStore::get`]) is treated as a miss, never propagated as
//! a failure to the caller.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vorion_cache::DecisionCache;
//! use vorion_cache::shared::InMemorySharedStore;
//! use vorion_core::types::{ConstraintResult, ControlAction, Decision, Intent, TrustScore, TrustTier};
//! use std::collections::BTreeMap;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let cache = DecisionCache::new(100, 60_000, Arc::new(InMemorySharedStore::new()));
//!
//!     let intent = Intent {
//!         id: "intent-1".into(),
//!         tenant_id: "tenant-1".into(),
//!         entity_id: "agent-1".into(),
//!         intent_type: "data.read".into(),
//!         goal: "read a report".into(),
//!         context: BTreeMap::new(),
//!         priority: 0,
//!         created_at_ms: 0,
//!     };
//!
//!     assert!(cache.get(&intent, TrustTier::T3).await.is_none());
//! });
//! ```

pub mod fingerprint;
pub mod local;
pub mod shared;

use std::sync::Arc;
use std::time::Duration;

use vorion_core::types::{Decision, Intent, TrustTier};

pub use fingerprint::fingerprint;
use local::LocalCache;
use shared::{GuardedSharedStore, SharedStore};

/// The two-tier decision cache.
pub struct DecisionCache {
    local: LocalCache,
    shared: GuardedSharedStore,
    ttl_ms: u64,
}

impl DecisionCache {
    pub fn new(local_capacity: usize, ttl_ms: u64, shared: Arc<dyn SharedStore>) -> Self {
        Self {
            local: LocalCache::new(local_capacity, ttl_ms),
            shared: GuardedSharedStore::new(shared),
            ttl_ms,
        }
    }

    /// Look up a cached decision for `intent` evaluated at `trust_tier`,
    /// checking the local tier first and falling back to the distributed
    /// tier on a local miss.
    pub async fn get(&self, intent: &Intent, trust_tier: TrustTier) -> Option<Decision> {
        let key = fingerprint(intent, trust_tier);
        if let Some(decision) = self.local.get(&key) {
            return Some(decision);
        }
        let decision = self.shared.get(&key).await?;
        self.local.set(key, decision.clone());
        Some(decision)
    }

    /// Cache a decision for `intent` at `trust_tier` in both tiers. Callers
    /// skip this for pending-escalation decisions, since those are not yet
    /// final.
    pub async fn set(&self, intent: &Intent, trust_tier: TrustTier, decision: Decision) {
        let key = fingerprint(intent, trust_tier);
        self.shared.set(&key, &decision, self.ttl_ms).await;
        self.local.set(key, decision);
    }

    /// Remove every cached decision for `intent_id`, across every trust
    /// tier it may have been cached under.
    pub async fn invalidate(&self, intent_id: &str) {
        self.local.invalidate_intent(intent_id);
        self.shared.invalidate_intent(intent_id).await;
    }

    pub async fn invalidate_tenant(&self, tenant_id: &str) {
        self.local.invalidate_tenant(tenant_id);
        self.shared.invalidate_tenant(tenant_id).await;
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Spawn a background task that sweeps TTL-expired local entries every
    /// `interval` (default 30s).
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = self.local.sweep_expired();
                if evicted > 0 {
                    tracing::info!(evicted, "decision cache sweep evicted expired entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::InMemorySharedStore;
    use std::collections::BTreeMap;
    use vorion_core::types::{ConstraintResult, ControlAction, TrustScore, TrustTier};

    fn sample_intent(id: &str) -> Intent {
        Intent {
            id: id.into(),
            tenant_id: "tenant-1".into(),
            entity_id: "agent-1".into(),
            intent_type: "data.read".into(),
            goal: "read".into(),
            context: BTreeMap::new(),
            priority: 0,
            created_at_ms: 0,
        }
    }

    fn sample_decision() -> Decision {
        Decision {
            id: "d1".into(),
            intent_id: "i1".into(),
            tenant_id: "tenant-1".into(),
            final_action: ControlAction::Allow,
            reason: "ok".into(),
            confidence: 1.0,
            constraints: Vec::<ConstraintResult>::new(),
            policies_evaluated: Vec::new(),
            trust_score: TrustScore { raw: 500, effective: 500 },
            trust_tier: TrustTier::T3,
            decided_at_ms: 0,
            duration_ms: 0.1,
            cached: false,
            escalation: None,
            trace_id: "t1".into(),
            span_id: "s1".into(),
        }
    }

    #[tokio::test]
    async fn miss_then_set_then_hit() {
        let cache = DecisionCache::new(10, 60_000, Arc::new(InMemorySharedStore::new()));
        let intent = sample_intent("intent-1");
        assert!(cache.get(&intent, TrustTier::T3).await.is_none());
        cache.set(&intent, TrustTier::T3, sample_decision()).await;
        assert!(cache.get(&intent, TrustTier::T3).await.is_some());
    }

    #[tokio::test]
    async fn different_trust_tier_is_a_cache_miss() {
        let cache = DecisionCache::new(10, 60_000, Arc::new(InMemorySharedStore::new()));
        let intent = sample_intent("intent-1");
        cache.set(&intent, TrustTier::T3, sample_decision()).await;
        assert!(cache.get(&intent, TrustTier::T1).await.is_none());
    }

    #[tokio::test]
    async fn shared_hit_backfills_local() {
        let shared = Arc::new(InMemorySharedStore::new());
        let cache = DecisionCache::new(10, 60_000, shared.clone());
        let intent = sample_intent("intent-1");
        let key = fingerprint(&intent, TrustTier::T3);
        shared.set(&key, &sample_decision(), 60_000).await.unwrap();

        assert_eq!(cache.local_len(), 0);
        assert!(cache.get(&intent, TrustTier::T3).await.is_some());
        assert_eq!(cache.local_len(), 1);
    }

    #[tokio::test]
    async fn invalidate_removes_from_both_tiers_by_intent_id() {
        let cache = DecisionCache::new(10, 60_000, Arc::new(InMemorySharedStore::new()));
        let intent = sample_intent("intent-1");
        cache.set(&intent, TrustTier::T3, sample_decision()).await;
        cache.invalidate("i1").await;
        assert!(cache.get(&intent, TrustTier::T3).await.is_none());
    }
}
