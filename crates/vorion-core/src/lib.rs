// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! # vorion-core
//!
//! Core data model and trust kernel for the Vorion agent-governance
//! decision-and-audit core.
//!
//! This crate is `no_std`-compatible (requires `alloc`). Enable the `std`
//! feature (on by default) for structured logging of kernel events and the
//! full error trait implementation.
//!
//! ## Architecture
//!
//! ```text
//! TrustKernel
//!   ├── ceiling enforcement   — clamp(raw) -> effective, audited on change
//!   ├── tier derivation       — pure function of effective score
//!   ├── role/tier gate        — ROLE_GATE_MATRIX lookup
//!   ├── context binding       — sealed LOCAL/ENTERPRISE/SOVEREIGN scope
//!   └── creation modifiers    — FRESH/CLONED/EVOLVED/PROMOTED/IMPORTED
//!
//! BasisPolicyEngine
//!   ├── rules      — per-deployment, mutable, versioned
//!   └── exceptions — per-agent, expiring, take precedence over rules
//! ```
//!
//! Everything that touches I/O (persistence, the rule evaluator, the
//! enforcement pipeline itself) lives in sibling crates; this crate holds
//! only the pure data model and the kernel's synchronous, CPU-bound logic.
//!
//! ## Quick Start
//!
//! ```rust
//! use vorion_core::{
//!     trust::TrustKernel,
//!     storage::InMemoryStorage,
//!     types::ContextBindingType,
//! };
//!
//! let mut kernel = TrustKernel::new(InMemoryStorage::new());
//!
//! let binding = kernel.create_agent_context("tenant-1", ContextBindingType::Enterprise, 0);
//! assert!(kernel.verify_context_integrity(&binding).is_ok());
//!
//! let outcome = kernel.apply_score_delta("agent-1", 600);
//! assert_eq!(outcome.score.effective, 600);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod policy;
pub mod storage;
pub mod trust;
pub mod types;

// Config loader — TOML file and environment variable loading.
// Only compiled when the "config-loader" feature is enabled.
#[cfg(feature = "config-loader")]
pub mod config_loader;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{ErrorCode, ErrorEnvelope, VorionError};
pub use storage::{InMemoryStorage, Storage};
pub use trust::TrustKernel;
pub use types::{
    AgentRole, ConstraintKind, ConstraintResult, ContextBinding, ContextBindingType,
    ControlAction, CreationInfo, CreationType, Decision, Entity, EscalationRecord,
    EscalationStatus, EscalationTransition, Intent, TrustScore, TrustTier,
};

#[cfg(feature = "config-loader")]
pub use config_loader::{load_config, load_config_from_env, ConfigError, VorionFileConfig};
