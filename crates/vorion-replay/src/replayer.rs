// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Deterministic replay of a restored context through the decision
//! pipeline, with a configurable stop point and an optional artificial
//! delay (scaled by `speed_factor`) between steps so a replay can be
//! slowed down for inspection or sped up for bulk re-evaluation.

use std::sync::Arc;
use std::time::Duration;

use vorion_core::storage::Storage;
use vorion_core::types::{
    AgentRole, ContextBinding, ContextBindingType, CreationInfo, CreationType, Decision, Entity,
    EntityType,
};
use vorion_engine::engine::{EnforcementContext, EnforcementEngine};
use vorion_engine::evaluator::RuleEvaluator;

use crate::snapshot::RestoredContext;

/// How far through the pipeline a replay should run before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StopAt {
    Restore,
    TrustEvaluation,
    PolicyEvaluation,
    Decision,
    Execution,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: &'static str,
    pub status: StepStatus,
    pub duration_ms: f64,
}

#[derive(Debug, Clone)]
pub struct ReplayOutput {
    pub steps: Vec<StepResult>,
    pub decision: Option<Decision>,
}

/// Replays a [`RestoredContext`] through an [`EnforcementEngine`].
///
/// `dry_run` (default `true`) skips the cache-set and audit-enqueue side
/// effects by constructing the engine call with `use_cache: false` and is
/// otherwise a full re-evaluation — "dry" here means "no persisted trace
/// of the replay itself", not "no computation".
pub struct Replayer<S: Storage> {
    engine: Arc<EnforcementEngine<S>>,
    base_step_delay_ms: u64,
}

const STEP_ORDER: [StopAt; 6] = [
    StopAt::Restore,
    StopAt::TrustEvaluation,
    StopAt::PolicyEvaluation,
    StopAt::Decision,
    StopAt::Execution,
    StopAt::Complete,
];

impl<S: Storage> Replayer<S> {
    pub fn new(engine: Arc<EnforcementEngine<S>>) -> Self {
        Self { engine, base_step_delay_ms: 0 }
    }

    pub fn with_base_step_delay_ms(mut self, delay_ms: u64) -> Self {
        self.base_step_delay_ms = delay_ms;
        self
    }

    pub async fn replay(
        &self,
        restored: RestoredContext,
        stop_at: StopAt,
        dry_run: bool,
        speed_factor: f64,
    ) -> ReplayOutput {
        let mut steps = Vec::new();
        let delay = self.scaled_delay(speed_factor);

        steps.push(self.run_step("restore", delay).await);
        if stop_at == StopAt::Restore {
            return ReplayOutput { steps, decision: None };
        }

        let entity = synthetic_entity(&restored);
        steps.push(self.run_step("trust-evaluation", delay).await);
        if stop_at == StopAt::TrustEvaluation {
            return ReplayOutput { steps, decision: None };
        }

        let policy_id = restored.policies.first().map(|reference| reference.policy_id.clone());
        steps.push(self.run_step("policy-evaluation", delay).await);
        if stop_at == StopAt::PolicyEvaluation {
            return ReplayOutput { steps, decision: None };
        }

        let decision = self
            .engine
            .decide(EnforcementContext {
                intent: restored.intent,
                entity,
                environment: std::collections::BTreeMap::new(),
                required_tier: None,
                policy_id,
                escalation_rules: Vec::new(),
                use_cache: !dry_run,
            })
            .await;
        steps.push(StepResult { name: "decision", status: StepStatus::Completed, duration_ms: decision.duration_ms });
        if stop_at == StopAt::Decision {
            return ReplayOutput { steps, decision: Some(decision) };
        }

        // This engine has no side-effecting "execution" phase beyond the
        // decision itself (no route dispatch, per the Non-goals); replay
        // marks it skipped rather than fabricating work.
        steps.push(StepResult { name: "execution", status: StepStatus::Skipped, duration_ms: 0.0 });
        steps.push(StepResult { name: "complete", status: StepStatus::Completed, duration_ms: 0.0 });

        ReplayOutput { steps, decision: Some(decision) }
    }

    fn scaled_delay(&self, speed_factor: f64) -> Duration {
        if self.base_step_delay_ms == 0 || speed_factor <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_millis((self.base_step_delay_ms as f64 / speed_factor) as u64)
    }

    async fn run_step(&self, name: &'static str, delay: Duration) -> StepResult {
        let start = std::time::Instant::now();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        StepResult { name, status: StepStatus::Completed, duration_ms: start.elapsed().as_secs_f64() * 1000.0 }
    }
}

/// Rebuild a minimal [`Entity`] from a restored trust snapshot. Snapshots
/// capture trust and policy state, not full entity identity (role,
/// context binding, creation info) — those are assumed stable across
/// replay and reconstructed as the least-restrictive defaults so replay
/// fidelity is governed by the trust/policy inputs the snapshot actually
/// varies.
fn synthetic_entity(restored: &RestoredContext) -> Entity {
    Entity {
        id: restored.intent.entity_id.clone(),
        entity_type: EntityType::Agent,
        trust_score: restored.trust_snapshot.score,
        trust_tier: restored.trust_snapshot.tier,
        role: AgentRole::RL8,
        context_binding: ContextBinding {
            binding_type: ContextBindingType::Sovereign,
            tenant_id: restored.intent.tenant_id.clone(),
            max_tier: vorion_core::types::TrustTier::T5,
            integrity_hash: String::new(),
            sealed_at_ms: restored.environment.captured_at_ms,
        },
        creation_info: CreationInfo {
            creation_type: CreationType::Fresh,
            parent_id: None,
            created_at_ms: restored.environment.captured_at_ms,
            modifier: 0,
            integrity_hash: String::new(),
        },
    }
}

#[allow(dead_code)]
fn step_index(stop_at: StopAt) -> usize {
    STEP_ORDER.iter().position(|candidate| *candidate == stop_at).unwrap_or(STEP_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vorion_core::config::Config;
    use vorion_core::storage::InMemoryStorage;
    use vorion_core::types::{Intent, PolicyReference, TrustScore, TrustTier};
    use vorion_engine::evaluator::StaticRuleEvaluator;

    fn restored_context() -> RestoredContext {
        RestoredContext {
            intent: Intent {
                id: "intent-1".into(),
                tenant_id: "tenant-1".into(),
                entity_id: "agent-1".into(),
                intent_type: "data.read".into(),
                goal: "read".into(),
                context: BTreeMap::new(),
                priority: 0,
                created_at_ms: 0,
            },
            trust_snapshot: crate::snapshot::TrustSnapshot {
                score: TrustScore { raw: 500, effective: 500 },
                tier: TrustTier::T3,
            },
            policies: vec![PolicyReference {
                policy_id: "p1".into(),
                namespace: "default".into(),
                version: 1,
                checksum: "abc".into(),
            }],
            environment: crate::snapshot::EnvironmentSnapshot {
                captured_at_ms: 0,
                timezone: "UTC".into(),
                request_id: "r1".into(),
            },
        }
    }

    fn replayer() -> Replayer<InMemoryStorage> {
        let engine = Arc::new(EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::allow()) as Arc<dyn RuleEvaluator>,
            None,
            None,
            Config::default(),
            None,
        ));
        Replayer::new(engine)
    }

    #[tokio::test]
    async fn replay_to_restore_runs_one_step_and_no_decision() {
        let output = replayer().replay(restored_context(), StopAt::Restore, true, 1.0).await;
        assert_eq!(output.steps.len(), 1);
        assert!(output.decision.is_none());
    }

    #[tokio::test]
    async fn replay_to_complete_produces_a_decision() {
        let output = replayer().replay(restored_context(), StopAt::Complete, true, 1.0).await;
        assert!(output.decision.is_some());
        assert_eq!(output.steps.last().unwrap().name, "complete");
    }

    #[tokio::test]
    async fn dry_run_decision_is_not_cached() {
        let output = replayer().replay(restored_context(), StopAt::Decision, true, 1.0).await;
        let decision = output.decision.unwrap();
        assert!(!decision.cached);
    }
}
