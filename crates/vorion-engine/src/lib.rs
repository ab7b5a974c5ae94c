// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The enforcement engine: the decision path that turns an
//! [`vorion_core::types::Intent`] into a [`vorion_core::types::Decision`].
//!
//! [`engine::EnforcementEngine::decide`] runs the full eight-step
//! algorithm (cache probe, constraint evaluation, action resolution,
//! escalation check, confidence scoring, decision emission, cache set,
//! audit enqueue) end to end, wrapped in its own [`vorion_core::circuit_breaker::CircuitBreaker`]
//! so a failing rule evaluator degrades to a deny-biased fallback decision
//! rather than propagating an error.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use vorion_core::storage::InMemoryStorage;
//! use vorion_core::config::Config;
//! use vorion_core::types::{
//!     AgentRole, ContextBinding, ContextBindingType, CreationInfo, CreationType, Entity,
//!     EntityType, Intent, TrustScore, TrustTier,
//! };
//! use vorion_engine::engine::{EnforcementContext, EnforcementEngine};
//! use vorion_engine::evaluator::StaticRuleEvaluator;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let engine = EnforcementEngine::new(
//!         InMemoryStorage::new(),
//!         Arc::new(StaticRuleEvaluator::allow()),
//!         None,
//!         None,
//!         Config::default(),
//!         None,
//!     );
//!
//!     let entity = Entity {
//!         id: "agent-1".into(),
//!         entity_type: EntityType::Agent,
//!         trust_score: TrustScore { raw: 700, effective: 700 },
//!         trust_tier: TrustTier::T4,
//!         role: AgentRole::RL5,
//!         context_binding: ContextBinding {
//!             binding_type: ContextBindingType::Enterprise,
//!             tenant_id: "tenant-1".into(),
//!             max_tier: TrustTier::T4,
//!             integrity_hash: "x".into(),
//!             sealed_at_ms: 0,
//!         },
//!         creation_info: CreationInfo {
//!             creation_type: CreationType::Fresh,
//!             parent_id: None,
//!             created_at_ms: 0,
//!             modifier: 0,
//!             integrity_hash: "x".into(),
//!         },
//!     };
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
//!     let decision = engine.decide(EnforcementContext {
//!         intent,
//!         entity,
//!         environment: BTreeMap::new(),
//!         required_tier: None,
//!         policy_id: None,
//!         escalation_rules: Vec::new(),
//!         use_cache: false,
//!     }).await;
//!
//!     assert_eq!(decision.final_action.as_str(), "allow");
//! });
//! ```

pub mod engine;
pub mod error;
pub mod escalation;
pub mod evaluator;
pub mod metrics;

pub use engine::{EnforcementContext, EnforcementEngine};
pub use error::EnforcementError;
pub use evaluator::{RuleEvaluation, RuleEvaluator};
