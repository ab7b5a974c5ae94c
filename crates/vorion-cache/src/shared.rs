// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The distributed tier of the decision cache: a pluggable `SharedStore`
//! behind a circuit breaker, so a slow or unreachable distributed cache
//! degrades to local-only lookups instead of blocking the decision path.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use vorion_core::circuit_breaker::{BreakerConfig, CallPermit, CircuitBreaker};
use vorion_core::types::Decision;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

/// The distributed decision-cache tier. Implementors are expected to
/// serialize `Decision` to bytes on the wire — [`Self::get`] returning an
/// error (not `Ok(None)`) signals a corrupt or undeserializable entry,
/// which the caller treats as a cache miss and deletes.
#[async_trait]
pub trait SharedStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Decision>, String>;
    async fn set(&self, key: &str, decision: &Decision, ttl_ms: u64) -> Result<(), String>;
    async fn invalidate(&self, key: &str) -> Result<(), String>;
    async fn invalidate_tenant(&self, tenant_id: &str) -> Result<(), String>;
    /// Remove every cached decision for `intent_id`. A real distributed
    /// store generally has no secondary index on embedded fields, so this
    /// is best-effort: implementations that cannot scan efficiently may
    /// leave stale entries to expire via TTL instead of erroring.
    async fn invalidate_intent(&self, intent_id: &str) -> Result<(), String>;
}

/// In-process double for [`SharedStore`], used in tests and any single-node
/// deployment that does not need a real distributed cache.
#[derive(Default)]
pub struct InMemorySharedStore {
    entries: DashMap<String, (Decision, u64)>,
}

impl InMemorySharedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SharedStore for InMemorySharedStore {
    async fn get(&self, key: &str) -> Result<Option<Decision>, String> {
        let now = now_ms();
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.1 <= now {
            drop(entry);
            self.entries.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.0.clone()))
    }

    async fn set(&self, key: &str, decision: &Decision, ttl_ms: u64) -> Result<(), String> {
        let expires_at_ms = now_ms() + ttl_ms;
        let should_write = match self.entries.get(key) {
            Some(existing) => decision.decided_at_ms >= existing.0.decided_at_ms,
            None => true,
        };
        if should_write {
            self.entries.insert(key.to_string(), (decision.clone(), expires_at_ms));
        }
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), String> {
        self.entries.remove(key);
        Ok(())
    }

    async fn invalidate_tenant(&self, tenant_id: &str) -> Result<(), String> {
        self.entries.retain(|_, (decision, _)| decision.tenant_id != tenant_id);
        Ok(())
    }

    async fn invalidate_intent(&self, intent_id: &str) -> Result<(), String> {
        self.entries.retain(|_, (decision, _)| decision.intent_id != intent_id);
        Ok(())
    }
}

/// Wraps a [`SharedStore`] with a [`CircuitBreaker`] so repeated failures
/// stop blocking the decision path on the distributed tier.
pub struct GuardedSharedStore {
    inner: Arc<dyn SharedStore>,
    breaker: CircuitBreaker,
}

impl GuardedSharedStore {
    pub fn new(inner: Arc<dyn SharedStore>) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new("decision_cache_shared_store", BreakerConfig::default()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Decision> {
        if self.breaker.before_call() == CallPermit::Rejected {
            return None;
        }
        match self.inner.get(key).await {
            Ok(decision) => {
                self.breaker.on_success();
                decision
            }
            Err(error) => {
                tracing::warn!(key, error, "shared decision cache read failed");
                self.breaker.on_failure();
                None
            }
        }
    }

    pub async fn set(&self, key: &str, decision: &Decision, ttl_ms: u64) {
        if self.breaker.before_call() == CallPermit::Rejected {
            return;
        }
        match self.inner.set(key, decision, ttl_ms).await {
            Ok(()) => self.breaker.on_success(),
            Err(error) => {
                tracing::warn!(key, error, "shared decision cache write failed");
                self.breaker.on_failure();
            }
        }
    }

    pub async fn invalidate(&self, key: &str) {
        let _ = self.inner.invalidate(key).await;
    }

    pub async fn invalidate_tenant(&self, tenant_id: &str) {
        let _ = self.inner.invalidate_tenant(tenant_id).await;
    }

    pub async fn invalidate_intent(&self, intent_id: &str) {
        let _ = self.inner.invalidate_intent(intent_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vorion_core::types::{ConstraintResult, ControlAction, TrustScore, TrustTier};

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
    async fn in_memory_store_round_trips() {
        let store = InMemorySharedStore::new();
        store.set("k1", &sample_decision(), 60_000).await.unwrap();
        let decision = store.get("k1").await.unwrap();
        assert!(decision.is_some());
    }

    #[tokio::test]
    async fn guarded_store_proxies_successful_calls() {
        let guarded = GuardedSharedStore::new(Arc::new(InMemorySharedStore::new()));
        guarded.set("k1", &sample_decision(), 60_000).await;
        let decision = guarded.get("k1").await;
        assert!(decision.is_some());
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_a_miss() {
        let store = InMemorySharedStore::new();
        store.set("k1", &sample_decision(), 0).await.unwrap();
        assert!(store.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_does_not_overwrite_with_an_older_decision() {
        let store = InMemorySharedStore::new();
        let mut newer = sample_decision();
        newer.decided_at_ms = 100;
        let mut older = sample_decision();
        older.decided_at_ms = 10;

        store.set("k1", &newer, 60_000).await.unwrap();
        store.set("k1", &older, 60_000).await.unwrap();

        let stored = store.get("k1").await.unwrap().unwrap();
        assert_eq!(stored.decided_at_ms, 100);
    }

    #[tokio::test]
    async fn invalidate_intent_removes_matching_entries_only() {
        let store = InMemorySharedStore::new();
        let mut a = sample_decision();
        a.intent_id = "intent-1".into();
        let mut b = sample_decision();
        b.intent_id = "intent-2".into();
        store.set("a", &a, 60_000).await.unwrap();
        store.set("b", &b, 60_000).await.unwrap();
        store.invalidate_intent("intent-1").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_some());
    }
}
