// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Bulk simulation: run a batch of synthetic intents through an
//! [`EnforcementEngine`] with bounded concurrency and aggregate the
//! resulting action breakdown and per-policy match rate, without
//! persisting any of it to the audit trail.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use vorion_core::storage::Storage;
use vorion_core::types::{ControlAction, Entity, Intent};
use vorion_engine::engine::{EnforcementContext, EnforcementEngine};

/// One synthetic case to evaluate: an intent and the entity issuing it.
#[derive(Debug, Clone)]
pub struct SimulationCase {
    pub intent: Intent,
    pub entity: Entity,
    pub policy_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationSummary {
    pub total: u64,
    pub action_counts: BTreeMap<&'static str, u64>,
    pub policy_match_counts: BTreeMap<String, u64>,
    pub average_duration_ms: f64,
}

pub struct Simulator<S: Storage> {
    engine: Arc<EnforcementEngine<S>>,
    concurrency: usize,
}

impl<S: Storage + 'static> Simulator<S> {
    pub fn new(engine: Arc<EnforcementEngine<S>>, concurrency: usize) -> Self {
        Self { engine, concurrency: concurrency.max(1) }
    }

    /// Run every case, bounded to at most `concurrency` decisions in
    /// flight at once, and aggregate the results. Individual decisions
    /// always run with `use_cache: false` so one simulation run cannot
    /// poison another's cache.
    pub async fn run(&self, cases: Vec<SimulationCase>) -> SimulationSummary {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for case in cases {
            let engine = Arc::clone(&self.engine);
            let permit = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = permit.acquire_owned().await.expect("simulation semaphore closed");
                let policy_id = case.policy_id.clone();
                let decision = engine
                    .decide(EnforcementContext {
                        intent: case.intent,
                        entity: case.entity,
                        environment: BTreeMap::new(),
                        required_tier: None,
                        policy_id,
                        escalation_rules: Vec::new(),
                        use_cache: false,
                    })
                    .await;
                decision
            });
        }

        let mut summary = SimulationSummary::default();
        let mut duration_sum = 0.0;

        while let Some(result) = tasks.join_next().await {
            let decision = result.expect("simulation task panicked");
            summary.total += 1;
            duration_sum += decision.duration_ms;
            *summary.action_counts.entry(action_label(decision.final_action)).or_insert(0) += 1;
            for reference in &decision.policies_evaluated {
                *summary.policy_match_counts.entry(reference.policy_id.clone()).or_insert(0) += 1;
            }
        }

        if summary.total > 0 {
            summary.average_duration_ms = duration_sum / summary.total as f64;
        }
        summary
    }
}

fn action_label(action: ControlAction) -> &'static str {
    action.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vorion_core::config::Config;
    use vorion_core::storage::InMemoryStorage;
    use vorion_core::types::{
        AgentRole, ContextBinding, ContextBindingType, CreationInfo, CreationType, EntityType,
        TrustScore, TrustTier,
    };
    use vorion_engine::evaluator::StaticRuleEvaluator;

    fn sample_case(id: &str) -> SimulationCase {
        SimulationCase {
            intent: Intent {
                id: format!("intent-{id}"),
                tenant_id: "tenant-1".into(),
                entity_id: format!("agent-{id}"),
                intent_type: "data.read".into(),
                goal: "read".into(),
                context: BTreeMap::new(),
                priority: 0,
                created_at_ms: 0,
            },
            entity: Entity {
                id: format!("agent-{id}"),
                entity_type: EntityType::Agent,
                trust_score: TrustScore { raw: 700, effective: 700 },
                trust_tier: TrustTier::T4,
                role: AgentRole::RL5,
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
            },
            policy_id: None,
        }
    }

    #[tokio::test]
    async fn run_aggregates_action_counts_across_all_cases() {
        let engine = Arc::new(EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::allow()),
            None,
            None,
            Config::default(),
            None,
        ));
        let simulator = Simulator::new(engine, 4);
        let cases = (0..20).map(|i| sample_case(&i.to_string())).collect();
        let summary = simulator.run(cases).await;
        assert_eq!(summary.total, 20);
        assert_eq!(summary.action_counts.get("allow").copied().unwrap_or(0), 20);
    }

    #[tokio::test]
    async fn run_with_empty_cases_is_a_no_op() {
        let engine = Arc::new(EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::allow()),
            None,
            None,
            Config::default(),
            None,
        ));
        let simulator = Simulator::new(engine, 4);
        let summary = simulator.run(Vec::new()).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_duration_ms, 0.0);
    }
}
