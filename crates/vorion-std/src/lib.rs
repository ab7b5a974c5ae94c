// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! `std`-only storage backends for Vorion.
//!
//! [`vorion_core`] stays `no_std` + `alloc` so its pure trust-kernel logic
//! never pulls in a filesystem dependency; every backend that actually
//! touches disk lives here instead — [`storage::FileStorage`] for
//! trust/context/creation/policy state, [`audit::FileAuditPersist`] for
//! the audit hash chain.
//!
//! # Example
//!
//! ```rust,no_run
//! use vorion_core::storage::Storage;
//! use vorion_core::types::TrustScore;
//! use vorion_std::storage::FileStorage;
//!
//! let mut storage = FileStorage::open("/tmp/vorion-example.json").unwrap();
//! storage.set_trust_score("agent-1", TrustScore { raw: 600, effective: 600 });
//! assert_eq!(storage.get_trust_score("agent-1").unwrap().effective, 600);
//! ```

pub mod audit;
pub mod storage;

pub use audit::FileAuditPersist;
pub use storage::FileStorage;
