// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Snapshot capture, deterministic replay, comparison, and bulk
//! simulation built on top of [`vorion_engine`]'s decision path.
//!
//! - [`snapshot::SnapshotManager`] freezes a decision's inputs and output
//!   so it can be replayed later.
//! - [`replayer::Replayer`] re-runs a restored snapshot through the
//!   engine, stopping at a configurable point in the pipeline.
//! - [`comparator::Comparator`] diffs an original decision against a
//!   replayed one into severity-classified differences.
//! - [`simulator::Simulator`] runs a batch of synthetic intents through
//!   the engine with bounded concurrency, without touching the audit
//!   trail.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use vorion_core::config::Config;
//! use vorion_core::storage::InMemoryStorage;
//! use vorion_core::types::{Intent, TrustScore, TrustTier};
//! use vorion_engine::engine::EnforcementEngine;
//! use vorion_engine::evaluator::StaticRuleEvaluator;
//! use vorion_replay::replayer::{Replayer, StopAt};
//! use vorion_replay::snapshot::{EnvironmentSnapshot, RestoreOverrides, TrustSnapshot};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let engine = Arc::new(EnforcementEngine::new(
//!         InMemoryStorage::new(),
//!         Arc::new(StaticRuleEvaluator::allow()),
//!         None,
//!         None,
//!         Config::default(),
//!         None,
//!     ));
//!
//!     let restored = vorion_replay::snapshot::RestoredContext {
//!         intent: Intent {
//!             id: "intent-1".into(),
//!             tenant_id: "tenant-1".into(),
//!             entity_id: "agent-1".into(),
//!             intent_type: "data.read".into(),
//!             goal: "read".into(),
//!             context: BTreeMap::new(),
//!             priority: 0,
//!             created_at_ms: 0,
//!         },
//!         trust_snapshot: TrustSnapshot { score: TrustScore { raw: 500, effective: 500 }, tier: TrustTier::T3 },
//!         policies: Vec::new(),
//!         environment: EnvironmentSnapshot { captured_at_ms: 0, timezone: "UTC".into(), request_id: "r1".into() },
//!     };
//!
//!     let output = Replayer::new(engine).replay(restored, StopAt::Complete, true, 1.0).await;
//!     assert!(output.decision.is_some());
//! });
//! let _ = RestoreOverrides::default();
//! ```

pub mod comparator;
pub mod replayer;
pub mod simulator;
pub mod snapshot;

pub use comparator::{Comparator, Difference, DifferenceKind, Severity};
pub use replayer::{Replayer, ReplayOutput, StepResult, StepStatus, StopAt};
pub use simulator::{SimulationCase, SimulationSummary, Simulator};
pub use snapshot::{RestoreOverrides, RestoredContext, Snapshot, SnapshotManager};
