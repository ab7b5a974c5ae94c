// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! # Axum Middleware Example
//!
//! Demonstrates wiring [`vorion_engine::engine::EnforcementEngine`] into an
//! Axum HTTP server as request-level middleware. Every inbound request
//! carries `X-Agent-Id` headers; the middleware resolves the entity,
//! builds an intent from the method and path, and either lets the request
//! through or rejects it with `403 Forbidden` depending on the decided
//! [`vorion_core::types::ControlAction`].
//!
//! Route wiring itself is outside this repository's scope — `axum` is not
//! a dependency of any crate here. This file is a standalone illustration
//! of the integration seam; add `axum`, `tower`, and `tower-http` to a
//! downstream binary crate to actually run it.

use std::collections::BTreeMap;
use std::sync::Arc;

use vorion_core::config::Config;
use vorion_core::storage::InMemoryStorage;
use vorion_core::types::{
    AgentRole, ContextBinding, ContextBindingType, ControlAction, CreationInfo, CreationType,
    Entity, EntityType, Intent, TrustScore, TrustTier,
};
use vorion_engine::engine::{EnforcementContext, EnforcementEngine};
use vorion_engine::evaluator::{RuleEvaluator, StaticRuleEvaluator};

/// Thread-safe engine handle shared across Axum handlers via `State`.
type SharedEngine = Arc<EnforcementEngine<InMemoryStorage>>;

fn build_engine() -> SharedEngine {
    let evaluator: Arc<dyn RuleEvaluator> = Arc::new(StaticRuleEvaluator::allow());
    Arc::new(EnforcementEngine::new(InMemoryStorage::new(), evaluator, None, None, Config::default(), None))
}

fn api_entity(agent_id: &str, tier: TrustTier) -> Entity {
    Entity {
        id: agent_id.into(),
        entity_type: EntityType::Agent,
        trust_score: TrustScore { raw: tier as u64 * 200, effective: tier as u64 * 200 },
        trust_tier: tier,
        role: AgentRole::RL3,
        context_binding: ContextBinding {
            binding_type: ContextBindingType::Enterprise,
            tenant_id: "tenant-api".into(),
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

/// Result of the middleware's gate check.
#[derive(Debug)]
pub struct GateResult {
    pub action: ControlAction,
    pub reason: String,
    pub status: u16,
}

/// Framework-agnostic core of the middleware: build an intent for the
/// given route and decide it. Call this from an Axum `middleware::from_fn`
/// closure, a Tower layer, or any other request interceptor.
pub async fn governance_gate(engine: &EnforcementEngine<InMemoryStorage>, entity: Entity, route: &str) -> GateResult {
    let intent = Intent {
        id: format!("intent-{route}"),
        tenant_id: "tenant-api".into(),
        entity_id: entity.id.clone(),
        intent_type: "http.request".into(),
        goal: route.into(),
        context: BTreeMap::new(),
        priority: 0,
        created_at_ms: 0,
    };

    let decision = engine
        .decide(EnforcementContext {
            intent,
            entity,
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: None,
            escalation_rules: Vec::new(),
            use_cache: true,
        })
        .await;

    let status = match decision.final_action {
        ControlAction::Allow | ControlAction::Monitor => 200,
        ControlAction::Limit => 429,
        ControlAction::Escalate => 202,
        ControlAction::Deny | ControlAction::Terminate => 403,
    };

    GateResult { action: decision.final_action, reason: decision.reason, status }
}

#[tokio::main]
async fn main() {
    let engine = build_engine();

    println!("Vorion Enforcement Engine — Axum Middleware Example\n");
    println!("Simulating three incoming HTTP requests:\n");

    let requests = vec![
        ("agent-api-001", TrustTier::T3, "GET /data"),
        ("agent-api-002", TrustTier::T4, "POST /mutate"),
        ("unknown-agent", TrustTier::T0, "DELETE /nuke"),
    ];

    for (agent_id, tier, route) in requests {
        let entity = api_entity(agent_id, tier);
        let result = governance_gate(&engine, entity, route).await;
        println!("  {} {} -> HTTP {} ({})", agent_id, route, result.status, result.reason);
    }

    println!("\nAxum wiring (pseudo-code):");
    println!(
        r#"
  let app = Router::new()
      .route("/data",   get(data_handler))
      .route("/mutate", post(mutate_handler))
      .layer(middleware::from_fn_with_state(engine.clone(), governance_middleware));

  async fn governance_middleware(
      State(engine): State<SharedEngine>,
      headers: HeaderMap,
      request: Request,
      next: Next,
  ) -> Response {{
      let agent_id = headers.get("x-agent-id").and_then(|v| v.to_str().ok()).unwrap_or("unknown");
      let entity = resolve_entity(agent_id); // look up trust/context/role from storage
      let result = governance_gate(&engine, entity, request.uri().path()).await;

      if matches!(result.action, ControlAction::Allow | ControlAction::Monitor) {{
          next.run(request).await
      }} else {{
          (StatusCode::from_u16(result.status).unwrap(), result.reason).into_response()
      }}
  }}
"#
    );

    println!("Done.");
}
