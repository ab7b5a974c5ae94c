// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! # Basic Enforcement Engine Example
//!
//! Demonstrates the full decision pipeline against the in-memory storage
//! backend: trust assignment, policy rules, and enforcement decisions for
//! a handful of intents.
//!
//! This file is a standalone reference, not a compiled workspace example —
//! wire it into a binary crate's `src/bin/` or a package's `examples/`
//! directory to run it.

use std::collections::BTreeMap;
use std::sync::Arc;

use vorion_core::config::Config;
use vorion_core::policy::{BasisPolicyEngine, PolicyRule};
use vorion_core::storage::InMemoryStorage;
use vorion_core::types::{
    AgentRole, ContextBinding, ContextBindingType, ControlAction, CreationInfo, CreationType,
    Entity, EntityType, Intent, TrustScore, TrustTier,
};
use vorion_engine::engine::{EnforcementContext, EnforcementEngine};
use vorion_engine::evaluator::{RuleEvaluation, RuleEvaluator, StaticRuleEvaluator};

fn sample_entity(id: &str, tier: TrustTier, role: AgentRole) -> Entity {
    Entity {
        id: id.into(),
        entity_type: EntityType::Agent,
        trust_score: TrustScore { raw: tier as u64 * 200, effective: tier as u64 * 200 },
        trust_tier: tier,
        role,
        context_binding: ContextBinding {
            binding_type: ContextBindingType::Enterprise,
            tenant_id: "tenant-finance".into(),
            max_tier: TrustTier::T5,
            integrity_hash: "seed".into(),
            sealed_at_ms: 0,
        },
        creation_info: CreationInfo {
            creation_type: CreationType::Fresh,
            parent_id: None,
            created_at_ms: 0,
            modifier: 0,
            integrity_hash: "seed".into(),
        },
    }
}

fn sample_intent(id: &str, entity_id: &str, intent_type: &str, goal: &str) -> Intent {
    Intent {
        id: id.into(),
        tenant_id: "tenant-finance".into(),
        entity_id: entity_id.into(),
        intent_type: intent_type.into(),
        goal: goal.into(),
        context: BTreeMap::new(),
        priority: 0,
        created_at_ms: 0,
    }
}

#[tokio::main]
async fn main() {
    println!("Vorion Enforcement Engine — Basic Example\n");

    let mut policies = BasisPolicyEngine::new();
    policies.add_rule(
        "default",
        PolicyRule { id: "deny-delete".into(), condition: "intent_type == 'data.delete'".into(), action: ControlAction::Deny, priority: 0 },
    );
    println!("Policy 'default' seeded: deny-delete rule, version {:?}\n", policies.version("default"));

    let evaluator: Arc<dyn RuleEvaluator> = Arc::new(StaticRuleEvaluator::allow());
    let engine = EnforcementEngine::new(InMemoryStorage::new(), evaluator, None, None, Config::default(), None);

    let finance_agent = sample_entity("agent-finance-001", TrustTier::T4, AgentRole::RL5);
    let read_intent = sample_intent("intent-1", "agent-finance-001", "data.read", "read invoice");

    let decision = engine
        .decide(EnforcementContext {
            intent: read_intent,
            entity: finance_agent.clone(),
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: Some("default".into()),
            escalation_rules: Vec::new(),
            use_cache: false,
        })
        .await;
    print_decision("data.read (agent-finance-001)", decision.final_action.as_str(), &decision.reason);

    let deny_evaluator: Arc<dyn RuleEvaluator> = Arc::new(StaticRuleEvaluator::new(RuleEvaluation {
        matched_rule_ids: vec!["deny-delete".into()],
        final_action: Some(ControlAction::Deny),
        reason: "deny-delete rule matched".into(),
    }));
    let strict_engine = EnforcementEngine::new(InMemoryStorage::new(), deny_evaluator, None, None, Config::default(), None);
    let delete_intent = sample_intent("intent-2", "agent-finance-001", "data.delete", "purge old invoices");
    let delete_decision = strict_engine
        .decide(EnforcementContext {
            intent: delete_intent,
            entity: finance_agent,
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: Some("default".into()),
            escalation_rules: Vec::new(),
            use_cache: false,
        })
        .await;
    print_decision("data.delete (agent-finance-001)", delete_decision.final_action.as_str(), &delete_decision.reason);

    println!("\nDone.");
}

fn print_decision(label: &str, action: &str, reason: &str) {
    println!("[{label}] action={action} | reason={reason}");
}
