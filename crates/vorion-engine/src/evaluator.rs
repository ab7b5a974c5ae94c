// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The rule evaluator boundary.
//!
//! [`RuleEvaluator`] is the seam where an external rule-authoring system
//! (BASIS, or any equivalent) plugs into the enforcement engine. This crate
//! owns the call site and its circuit breaker; it never interprets a rule
//! condition itself.

use async_trait::async_trait;

use vorion_core::types::{ControlAction, Entity, Intent};

/// The output of a single rule-evaluator call: every rule id that matched
/// the intent, plus the evaluator's own opinion of the final action (if it
/// has one — some evaluators only report matches and let the engine's
/// constraint/action-resolution step decide).
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluation {
    pub matched_rule_ids: Vec<String>,
    pub final_action: Option<ControlAction>,
    pub reason: String,
}

/// External rule evaluation, invoked once per [`crate::engine::EnforcementEngine::decide`]
/// call unless the caller already supplied a [`RuleEvaluation`] in the
/// [`crate::engine::EnforcementContext`].
///
/// Implementors must be side-effect free with respect to engine state —
/// the engine treats an `Err` exactly like a breaker-open condition: fall
/// back to the configured default decision, uncached, confidence below 1.
#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    async fn evaluate(&self, intent: &Intent, entity: &Entity) -> Result<RuleEvaluation, String>;
}

/// A [`RuleEvaluator`] that always returns a fixed result, for tests and
/// deployments with no external rule engine wired up yet.
pub struct StaticRuleEvaluator {
    result: RuleEvaluation,
}

impl StaticRuleEvaluator {
    pub fn new(result: RuleEvaluation) -> Self {
        Self { result }
    }

    pub fn allow() -> Self {
        Self::new(RuleEvaluation {
            matched_rule_ids: Vec::new(),
            final_action: Some(ControlAction::Allow),
            reason: "no rules configured, implicit allow".into(),
        })
    }
}

#[async_trait]
impl RuleEvaluator for StaticRuleEvaluator {
    async fn evaluate(&self, _intent: &Intent, _entity: &Entity) -> Result<RuleEvaluation, String> {
        Ok(self.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vorion_core::types::{ContextBinding, ContextBindingType, CreationInfo, CreationType, EntityType, TrustScore, TrustTier, AgentRole};

    fn sample_intent() -> Intent {
        Intent {
            id: "intent-1".into(),
            tenant_id: "tenant-1".into(),
            entity_id: "agent-1".into(),
            intent_type: "data.read".into(),
            goal: "read".into(),
            context: BTreeMap::new(),
            priority: 0,
            created_at_ms: 0,
        }
    }

    fn sample_entity() -> Entity {
        Entity {
            id: "agent-1".into(),
            entity_type: EntityType::Agent,
            trust_score: TrustScore { raw: 500, effective: 500 },
            trust_tier: TrustTier::T3,
            role: AgentRole::RL3,
            context_binding: ContextBinding {
                binding_type: ContextBindingType::Enterprise,
                tenant_id: "tenant-1".into(),
                max_tier: TrustTier::T4,
                integrity_hash: "x".into(),
                sealed_at_ms: 0,
            },
            creation_info: CreationInfo {
                creation_type: CreationType::Fresh,
                parent_id: None,
                created_at_ms: 0,
                modifier: 0,
                integrity_hash: "x".into(),
            },
        }
    }

    #[tokio::test]
    async fn static_evaluator_returns_its_fixed_result() {
        let evaluator = StaticRuleEvaluator::allow();
        let result = evaluator.evaluate(&sample_intent(), &sample_entity()).await.unwrap();
        assert_eq!(result.final_action, Some(ControlAction::Allow));
    }
}
