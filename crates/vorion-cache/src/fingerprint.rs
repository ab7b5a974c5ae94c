// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Cache key derivation.
//!
//! The fingerprint is a SHA-256 digest over the intent's id, tenant, entity,
//! type, trust tier, and canonicalized context, truncated to 16 hex
//! characters. The context map is a `BTreeMap` already (see
//! `vorion_core::types::Intent`), so key iteration order is deterministic
//! without an extra sort pass.
//!
//! Including `intent.id` means two intents with identical tenant/entity/
//! type/context but different ids will never share a cache entry. This is
//! preserved deliberately rather than "fixed" — see `DESIGN.md`.
//!
//! Trust tier is folded into the key because a cached `Deny` issued at a
//! lower tier must not be served to the same intent once the entity's tier
//! has since risen (or vice versa) — the decision depends on tier, so the
//! key must too.

use sha2::{Digest, Sha256};
use vorion_core::types::{Intent, TrustTier};

/// Derive the cache key for an intent evaluated at a given trust tier.
pub fn fingerprint(intent: &Intent, trust_tier: TrustTier) -> String {
    let mut hasher = Sha256::new();
    hasher.update(intent.id.as_bytes());
    hasher.update(b"\0");
    hasher.update(intent.tenant_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(intent.entity_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(intent.intent_type.as_bytes());
    hasher.update(b"\0");
    hasher.update([trust_tier as u8]);
    hasher.update(b"\0");
    for (key, value) in &intent.context {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.to_string().as_bytes());
        hasher.update(b"&");
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn intent(id: &str, context: BTreeMap<String, serde_json::Value>) -> Intent {
        Intent {
            id: id.into(),
            tenant_id: "tenant-1".into(),
            entity_id: "agent-1".into(),
            intent_type: "data.read".into(),
            goal: "read".into(),
            context,
            priority: 0,
            created_at_ms: 0,
        }
    }

    #[test]
    fn identical_intents_fingerprint_identically() {
        let mut ctx = BTreeMap::new();
        ctx.insert("k".to_string(), serde_json::json!("v"));
        let a = intent("intent-1", ctx.clone());
        let b = intent("intent-1", ctx);
        assert_eq!(fingerprint(&a, TrustTier::T3), fingerprint(&b, TrustTier::T3));
    }

    #[test]
    fn different_intent_ids_fingerprint_differently() {
        let ctx = BTreeMap::new();
        let a = intent("intent-1", ctx.clone());
        let b = intent("intent-2", ctx);
        assert_ne!(fingerprint(&a, TrustTier::T3), fingerprint(&b, TrustTier::T3));
    }

    #[test]
    fn different_trust_tiers_fingerprint_differently() {
        let a = intent("intent-1", BTreeMap::new());
        assert_ne!(fingerprint(&a, TrustTier::T1), fingerprint(&a, TrustTier::T3));
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let a = intent("intent-1", BTreeMap::new());
        assert_eq!(fingerprint(&a, TrustTier::T3).len(), 16);
    }
}
