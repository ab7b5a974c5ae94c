// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Pluggable persistence for flushed audit batches. Production backends
//! (file-based, database) live in downstream crates (`vorion-std`); this
//! crate ships only the in-memory test double.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::record::AuditRecord;

/// Durable storage for audit batches. Implementors must treat `persist` as
/// all-or-nothing for the given batch — [`crate::sink::AuditSink`] re-queues
/// the whole batch at the head of the buffer on any error.
#[async_trait]
pub trait AuditPersist: Send + Sync {
    async fn persist(&self, batch: &[AuditRecord]) -> Result<(), String>;
    async fn query(&self, tenant_id: &str, limit: usize) -> Vec<AuditRecord>;
}

/// In-memory [`AuditPersist`] double, used in tests and any deployment
/// that accepts losing audit history on restart.
#[derive(Default)]
pub struct InMemoryAuditPersist {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditPersist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditPersist for InMemoryAuditPersist {
    async fn persist(&self, batch: &[AuditRecord]) -> Result<(), String> {
        self.records.lock().extend_from_slice(batch);
        Ok(())
    }

    async fn query(&self, tenant_id: &str, limit: usize) -> Vec<AuditRecord> {
        let limit = limit.min(1000);
        let records = self.records.lock();
        records
            .iter()
            .rev()
            .filter(|record| record.tenant_id == tenant_id)
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AuditOutcome, AuditSeverity, GENESIS_HASH};

    fn sample_record(tenant_id: &str, sequence_number: u64) -> AuditRecord {
        AuditRecord {
            id: format!("a{sequence_number}"),
            tenant_id: tenant_id.into(),
            event_type: "decision.made".into(),
            severity: AuditSeverity::Info,
            outcome: AuditOutcome::Success,
            actor: "agent-1".into(),
            target: "resource-1".into(),
            action: "allow".into(),
            reason: "test".into(),
            decision_id: None,
            before: None,
            after: None,
            metadata: serde_json::Value::Null,
            event_time_ms: 0,
            sequence_number,
            previous_hash: GENESIS_HASH.into(),
            record_hash: "deadbeef".into(),
            recorded_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn query_returns_newest_first_and_respects_limit() {
        let persist = InMemoryAuditPersist::new();
        persist.persist(&[sample_record("t1", 1), sample_record("t1", 2)]).await.unwrap();
        let records = persist.query("t1", 1).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence_number, 2);
    }

    #[tokio::test]
    async fn query_filters_by_tenant() {
        let persist = InMemoryAuditPersist::new();
        persist.persist(&[sample_record("t1", 1), sample_record("t2", 1)]).await.unwrap();
        let records = persist.query("t1", 10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tenant_id, "t1");
    }

    #[tokio::test]
    async fn query_caps_limit_at_one_thousand() {
        let persist = InMemoryAuditPersist::new();
        let batch: Vec<_> = (0..5).map(|i| sample_record("t1", i)).collect();
        persist.persist(&batch).await.unwrap();
        let records = persist.query("t1", 10_000).await;
        assert_eq!(records.len(), 5);
    }
}
