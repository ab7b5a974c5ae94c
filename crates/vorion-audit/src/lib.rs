// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Tamper-evident, hash-chained audit logging for the Vorion decision core.
//!
//! Every decision, escalation, and policy mutation is recorded as an
//! [`AuditRecord`] linked to the previous record for its tenant via a
//! SHA-256 hash chain ([`record::GENESIS_HASH`] seeds the chain). Records
//! are buffered in [`AuditSink`] and flushed to a pluggable
//! [`persist::AuditPersist`] backend on a fixed cadence, so the decision
//! path enqueuing a record never waits on durable storage.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vorion_audit::{AuditEntry, AuditOutcome, AuditSeverity, AuditSink, persist::InMemoryAuditPersist};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let sink = AuditSink::new(10_000, 100, Arc::new(InMemoryAuditPersist::new()));
//!     let entry = AuditEntry::new(
//!         "tenant-1", "decision.made", AuditSeverity::Info, AuditOutcome::Success,
//!         "agent-1", "resource-1", "allow", "policy matched", 0,
//!     );
//!     let record = sink.enqueue(entry, 0);
//!     assert!(record.verify());
//!
//!     sink.flush().await;
//!     let history = sink.query("tenant-1", 10).await;
//!     assert_eq!(history.len(), 1);
//! });
//! ```

pub mod persist;
pub mod record;
pub mod sink;

pub use persist::AuditPersist;
pub use record::{AuditEntry, AuditOutcome, AuditRecord, AuditSeverity, GENESIS_HASH};
pub use sink::AuditSink;
