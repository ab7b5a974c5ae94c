// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Bounded in-process decision cache.
//!
//! Backed by `dashmap` for lock-sharded concurrent access. Eviction is a
//! linear scan for the least-recently-accessed entry, acceptable at the
//! default 10k-entry capacity this is tuned for — a sharded structure with
//! a true O(1) LRU list is not worth the complexity at this scale.

use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use vorion_core::types::Decision;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
struct Entry {
    decision: Decision,
    inserted_at_ms: u64,
    last_accessed_at_ms: u64,
    access_count: u64,
}

/// Bounded local decision cache with TTL expiry and LRU-by-access eviction.
pub struct LocalCache {
    entries: DashMap<String, Entry>,
    capacity: usize,
    ttl_ms: u64,
}

impl LocalCache {
    pub fn new(capacity: usize, ttl_ms: u64) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity,
            ttl_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch a cached decision, if present and not TTL-expired. An expired
    /// entry is removed as part of the lookup rather than left for the
    /// sweeper, so a single stale read never returns stale data.
    pub fn get(&self, key: &str) -> Option<Decision> {
        let now = now_ms();
        let expired = self
            .entries
            .get(key)
            .map(|entry| now.saturating_sub(entry.inserted_at_ms) >= self.ttl_ms)
            .unwrap_or(false);

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get_mut(key).map(|mut entry| {
            entry.last_accessed_at_ms = now;
            entry.access_count += 1;
            entry.decision.clone()
        })
    }

    /// Insert or overwrite a cache entry, evicting the least-recently
    /// accessed entry first if at capacity.
    pub fn set(&self, key: String, decision: Decision) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_one();
        }
        let now = now_ms();
        self.entries.insert(
            key,
            Entry {
                decision,
                inserted_at_ms: now,
                last_accessed_at_ms: now,
                access_count: 0,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove every entry belonging to `tenant_id`.
    pub fn invalidate_tenant(&self, tenant_id: &str) {
        self.entries.retain(|_, entry| entry.decision.tenant_id != tenant_id);
    }

    /// Remove every cached decision for `intent_id`, across every trust
    /// tier it may have been cached under (the fingerprint includes tier,
    /// so a single intent can occupy more than one key).
    pub fn invalidate_intent(&self, intent_id: &str) {
        self.entries.retain(|_, entry| entry.decision.intent_id != intent_id);
    }

    /// Sweep TTL-expired entries. Intended to run on a fixed interval
    /// (default 30s) independent of lookups, so memory does not grow
    /// unbounded from keys nobody reads again.
    pub fn sweep_expired(&self) -> usize {
        let now = now_ms();
        let ttl = self.ttl_ms;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now.saturating_sub(entry.inserted_at_ms) < ttl);
        before - self.entries.len()
    }

    fn evict_one(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().last_accessed_at_ms)
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vorion_core::types::{ConstraintResult, ControlAction, TrustScore, TrustTier};

    fn sample_decision(tenant_id: &str) -> Decision {
        Decision {
            id: "d1".into(),
            intent_id: "i1".into(),
            tenant_id: tenant_id.into(),
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

    #[test]
    fn set_then_get_round_trips() {
        let cache = LocalCache::new(10, 60_000);
        cache.set("k1".into(), sample_decision("tenant-1"));
        let decision = cache.get("k1").unwrap();
        assert_eq!(decision.tenant_id, "tenant-1");
    }

    #[test]
    fn missing_key_is_none() {
        let cache = LocalCache::new(10, 60_000);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn evicts_least_recently_accessed_at_capacity() {
        let cache = LocalCache::new(2, 60_000);
        cache.set("a".into(), sample_decision("t"));
        cache.set("b".into(), sample_decision("t"));
        cache.get("a");
        cache.set("c".into(), sample_decision("t"));
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn expired_entry_is_evicted_on_read() {
        let cache = LocalCache::new(10, 10);
        cache.set("k1".into(), sample_decision("t"));
        std::thread::sleep(std::time::Duration::from_millis(25));
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn invalidate_tenant_removes_matching_entries_only() {
        let cache = LocalCache::new(10, 60_000);
        cache.set("a".into(), sample_decision("tenant-1"));
        cache.set("b".into(), sample_decision("tenant-2"));
        cache.invalidate_tenant("tenant-1");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn invalidate_intent_removes_every_tier_key() {
        let cache = LocalCache::new(10, 60_000);
        let mut low_tier = sample_decision("tenant-1");
        low_tier.intent_id = "intent-1".into();
        let mut high_tier = sample_decision("tenant-1");
        high_tier.intent_id = "intent-1".into();
        cache.set("key-low".into(), low_tier);
        cache.set("key-high".into(), high_tier);
        cache.set("key-other".into(), sample_decision("tenant-1"));
        cache.invalidate_intent("intent-1");
        assert!(cache.get("key-low").is_none());
        assert!(cache.get("key-high").is_none());
        assert!(cache.get("key-other").is_some());
    }
}
