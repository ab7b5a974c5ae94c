// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The basis policy engine: named rules plus per-agent exceptions that
//! override them, with exceptions taking precedence over rules and rules
//! taking precedence over an implicit allow.
//!
//! Every mutation — adding a rule, adding an exception, removing either —
//! bumps [`BasisPolicyEngine::version`] so a [`crate::types::PolicyReference`]
//! recorded on a [`crate::types::Decision`] can be matched back to the exact
//! rule set later.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{ControlAction, TrustTier};

/// A single named rule: if `condition` matches an intent, `action` applies.
/// `condition` is a flat string predicate (e.g. `"intent_type == 'data.delete'"`)
/// evaluated by the rule evaluator in `vorion-engine`; this crate only stores
/// and versions rules, it does not interpret conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    pub condition: String,
    pub action: ControlAction,
    /// Lower evaluates first. Ties broken by insertion order.
    pub priority: i32,
}

/// A per-agent override that takes precedence over every [`PolicyRule`]
/// while it is in force.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyException {
    pub id: String,
    pub entity_id: String,
    pub action: ControlAction,
    pub reason: String,
    /// Unix epoch milliseconds after which this exception no longer
    /// applies. `None` means it never expires.
    pub expires_at_ms: Option<u64>,
}

/// Filters a [`Policy`] applies against before it is considered in scope
/// for an intent. An empty list on either side means "no restriction on
/// that dimension" — an all-empty predicate matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetPredicate {
    /// Intent types this policy applies to. Empty matches every type.
    pub intent_types: Vec<String>,
    /// Trust tiers this policy applies to. Empty matches every tier.
    pub tiers: Vec<TrustTier>,
}

impl TargetPredicate {
    pub fn matches(&self, intent_type: &str, tier: TrustTier) -> bool {
        let type_ok = self.intent_types.is_empty() || self.intent_types.iter().any(|t| t == intent_type);
        let tier_ok = self.tiers.is_empty() || self.tiers.contains(&tier);
        type_ok && tier_ok
    }
}

/// A complete named policy: an ordered rule set plus active exceptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub namespace: String,
    pub version: u64,
    pub rules: Vec<PolicyRule>,
    pub exceptions: Vec<PolicyException>,
    /// Action applied when no rule matches and no exception is in force.
    /// Spec-default is [`ControlAction::Allow`]; a deployment that wants a
    /// closed-by-default policy sets this to [`ControlAction::Deny`].
    pub default_action: ControlAction,
    /// Intent-type and tier filters scoping which intents this policy is
    /// even considered for.
    pub target: TargetPredicate,
    /// Cryptographic digest over [`Self::fingerprint`], recomputed whenever
    /// [`BasisPolicyEngine`] mutates this policy so a stale checksum can
    /// never be observed by a caller holding a cloned `Policy`.
    pub checksum: String,
}

impl Policy {
    pub fn new(id: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut policy = Self {
            id: id.into(),
            namespace: namespace.into(),
            version: 1,
            rules: Vec::new(),
            exceptions: Vec::new(),
            default_action: ControlAction::Allow,
            target: TargetPredicate::default(),
            checksum: String::new(),
        };
        policy.checksum = policy.compute_checksum();
        policy
    }

    /// Order-sensitive digest of rule ids and actions, sufficient to detect
    /// that a policy changed between decision and replay without hashing.
    /// `checksum` is the cryptographic form of this string, kept in sync by
    /// [`Self::compute_checksum`] on every mutation.
    pub fn fingerprint(&self) -> String {
        let mut parts = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            parts.push(alloc::format!("{}:{}:{:?}", rule.priority, rule.id, rule.action));
        }
        parts.join(",")
    }

    /// SHA-256 of [`Self::fingerprint`], hex-encoded — the same hashing
    /// pattern `vorion_core::trust` uses for sealed-field integrity hashes.
    pub fn compute_checksum(&self) -> String {
        let digest = Sha256::digest(self.fingerprint().as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest {
            hex.push_str(&alloc::format!("{:02x}", byte));
        }
        hex
    }
}

/// Rules, in priority order, then the implicit allow. Exceptions for a
/// specific entity always win over both.
///
/// # Examples
///
/// ```rust
/// use vorion_core::policy::{BasisPolicyEngine, PolicyRule};
/// use vorion_core::types::ControlAction;
///
/// let mut engine = BasisPolicyEngine::new();
/// engine.add_rule("default", PolicyRule {
///     id: "deny-delete".into(),
///     condition: "intent_type == 'data.delete'".into(),
///     action: ControlAction::Deny,
///     priority: 0,
/// });
/// assert_eq!(engine.version("default"), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct BasisPolicyEngine {
    policies: HashMap<String, Policy>,
}

impl BasisPolicyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, policy_id: &str) -> Option<&Policy> {
        self.policies.get(policy_id)
    }

    pub fn version(&self, policy_id: &str) -> Option<u64> {
        self.policies.get(policy_id).map(|policy| policy.version)
    }

    fn ensure(&mut self, policy_id: &str) -> &mut Policy {
        self.policies
            .entry(policy_id.to_string())
            .or_insert_with(|| Policy::new(policy_id, "default"))
    }

    /// Add a rule to a policy, keeping rules sorted by priority, and bump
    /// the policy version.
    pub fn add_rule(&mut self, policy_id: &str, rule: PolicyRule) {
        let policy = self.ensure(policy_id);
        policy.rules.push(rule);
        policy.rules.sort_by_key(|rule| rule.priority);
        policy.version += 1;
        policy.checksum = policy.compute_checksum();
    }

    /// Remove a rule by id, bumping the policy version if anything was
    /// actually removed.
    pub fn remove_rule(&mut self, policy_id: &str, rule_id: &str) {
        if let Some(policy) = self.policies.get_mut(policy_id) {
            let before = policy.rules.len();
            policy.rules.retain(|rule| rule.id != rule_id);
            if policy.rules.len() != before {
                policy.version += 1;
                policy.checksum = policy.compute_checksum();
            }
        }
    }

    /// Add or replace a per-agent exception, bumping the policy version.
    pub fn add_exception(&mut self, policy_id: &str, exception: PolicyException) {
        let policy = self.ensure(policy_id);
        policy
            .exceptions
            .retain(|existing| existing.id != exception.id);
        policy.exceptions.push(exception);
        policy.version += 1;
        policy.checksum = policy.compute_checksum();
    }

    /// Remove an exception by id, bumping the policy version if anything
    /// was actually removed.
    pub fn remove_exception(&mut self, policy_id: &str, exception_id: &str) {
        if let Some(policy) = self.policies.get_mut(policy_id) {
            let before = policy.exceptions.len();
            policy.exceptions.retain(|exception| exception.id != exception_id);
            if policy.exceptions.len() != before {
                policy.version += 1;
                policy.checksum = policy.compute_checksum();
            }
        }
    }

    /// Set the default action and target predicate for a policy,
    /// bumping the version since either changes what the policy resolves to.
    pub fn configure_defaults(&mut self, policy_id: &str, default_action: ControlAction, target: TargetPredicate) {
        let policy = self.ensure(policy_id);
        policy.default_action = default_action;
        policy.target = target;
        policy.version += 1;
        policy.checksum = policy.compute_checksum();
    }

    /// Resolve the applicable [`ControlAction`] for `entity_id` under a
    /// policy, given which rule ids matched (matching itself is performed
    /// by the caller's rule evaluator; this only applies precedence).
    ///
    /// Precedence: an unexpired exception for `entity_id` wins outright;
    /// otherwise the lowest-priority matching rule applies; otherwise the
    /// policy's own [`Policy::default_action`] applies. A policy that is
    /// unknown, or whose [`TargetPredicate`](Policy::target) does not match
    /// `intent_type`/`tier`, resolves to [`ControlAction::Allow`] — it is
    /// out of scope for this intent rather than denying it.
    pub fn resolve(
        &self,
        policy_id: &str,
        entity_id: &str,
        intent_type: &str,
        tier: TrustTier,
        matched_rule_ids: &[&str],
        now_ms: u64,
    ) -> ControlAction {
        let Some(policy) = self.policies.get(policy_id) else {
            return ControlAction::Allow;
        };
        if !policy.target.matches(intent_type, tier) {
            return ControlAction::Allow;
        }

        if let Some(exception) = policy.exceptions.iter().find(|exception| {
            exception.entity_id == entity_id
                && exception.expires_at_ms.map(|expiry| expiry > now_ms).unwrap_or(true)
        }) {
            return exception.action;
        }

        policy
            .rules
            .iter()
            .find(|rule| matched_rule_ids.contains(&rule.id.as_str()))
            .map(|rule| rule.action)
            .unwrap_or(policy.default_action)
    }

    /// All policies, for persistence by a downstream storage backend.
    pub fn snapshot(&self) -> Vec<Policy> {
        self.policies.values().cloned().collect()
    }

    /// Replace the engine's policy set from a persisted snapshot, e.g. on
    /// process restart. Does not bump versions; the restored versions are
    /// taken as-is.
    pub fn restore(&mut self, policies: Vec<Policy>) {
        self.policies = policies.into_iter().map(|policy| (policy.id.clone(), policy)).collect();
    }
}

/// Fold a set of candidate actions down to the single most restrictive one,
/// per the fixed priority table `deny < terminate < escalate < limit <
/// monitor < allow` (lower variant discriminant wins).
///
/// Returns [`ControlAction::Allow`] for an empty slice — no constraint ran,
/// nothing vetoed the intent.
pub fn most_restrictive(actions: &[ControlAction]) -> ControlAction {
    actions
        .iter()
        .copied()
        .min()
        .unwrap_or(ControlAction::Allow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_restrictive_picks_lowest_discriminant() {
        let actions = [ControlAction::Allow, ControlAction::Monitor, ControlAction::Deny];
        assert_eq!(most_restrictive(&actions), ControlAction::Deny);
    }

    #[test]
    fn most_restrictive_of_empty_is_allow() {
        assert_eq!(most_restrictive(&[]), ControlAction::Allow);
    }

    #[test]
    fn adding_a_rule_bumps_version() {
        let mut engine = BasisPolicyEngine::new();
        engine.add_rule(
            "p1",
            PolicyRule {
                id: "r1".into(),
                condition: "true".into(),
                action: ControlAction::Deny,
                priority: 0,
            },
        );
        assert_eq!(engine.version("p1"), Some(2));
    }

    #[test]
    fn exception_overrides_matching_rule() {
        let mut engine = BasisPolicyEngine::new();
        engine.add_rule(
            "p1",
            PolicyRule {
                id: "r1".into(),
                condition: "true".into(),
                action: ControlAction::Deny,
                priority: 0,
            },
        );
        engine.add_exception(
            "p1",
            PolicyException {
                id: "e1".into(),
                entity_id: "agent-1".into(),
                action: ControlAction::Allow,
                reason: "manual override".into(),
                expires_at_ms: None,
            },
        );
        assert_eq!(
            engine.resolve("p1", "agent-1", "data.read", TrustTier::T3, &["r1"], 0),
            ControlAction::Allow
        );
        assert_eq!(
            engine.resolve("p1", "agent-2", "data.read", TrustTier::T3, &["r1"], 0),
            ControlAction::Deny
        );
    }

    #[test]
    fn expired_exception_does_not_apply() {
        let mut engine = BasisPolicyEngine::new();
        engine.add_rule(
            "p1",
            PolicyRule {
                id: "r1".into(),
                condition: "true".into(),
                action: ControlAction::Deny,
                priority: 0,
            },
        );
        engine.add_exception(
            "p1",
            PolicyException {
                id: "e1".into(),
                entity_id: "agent-1".into(),
                action: ControlAction::Allow,
                reason: "temporary".into(),
                expires_at_ms: Some(100),
            },
        );
        assert_eq!(
            engine.resolve("p1", "agent-1", "data.read", TrustTier::T3, &["r1"], 200),
            ControlAction::Deny
        );
    }

    #[test]
    fn unmatched_policy_defaults_to_allow() {
        let engine = BasisPolicyEngine::new();
        assert_eq!(
            engine.resolve("missing", "agent-1", "data.read", TrustTier::T3, &[], 0),
            ControlAction::Allow
        );
    }

    #[test]
    fn configured_deny_default_applies_when_no_rule_matches() {
        let mut engine = BasisPolicyEngine::new();
        engine.configure_defaults("p1", ControlAction::Deny, TargetPredicate::default());
        assert_eq!(
            engine.resolve("p1", "agent-1", "data.read", TrustTier::T3, &[], 0),
            ControlAction::Deny
        );
    }

    #[test]
    fn target_predicate_out_of_scope_is_allowed() {
        let mut engine = BasisPolicyEngine::new();
        engine.configure_defaults(
            "p1",
            ControlAction::Deny,
            TargetPredicate { intent_types: vec!["data.delete".into()], tiers: Vec::new() },
        );
        assert_eq!(
            engine.resolve("p1", "agent-1", "data.read", TrustTier::T3, &[], 0),
            ControlAction::Allow
        );
    }

    #[test]
    fn checksum_changes_when_rules_change() {
        let mut engine = BasisPolicyEngine::new();
        engine.add_rule(
            "p1",
            PolicyRule { id: "r1".into(), condition: "true".into(), action: ControlAction::Deny, priority: 0 },
        );
        let before = engine.get("p1").unwrap().checksum.clone();
        engine.add_rule(
            "p1",
            PolicyRule { id: "r2".into(), condition: "true".into(), action: ControlAction::Allow, priority: 1 },
        );
        let after = engine.get("p1").unwrap().checksum.clone();
        assert_ne!(before, after);
    }
}
