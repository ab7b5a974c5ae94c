// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The audit sink: a bounded in-memory buffer that a background task
//! drains into durable storage on a fixed cadence, never blocking the
//! decision path that enqueues into it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use vorion_core::circuit_breaker::{BreakerConfig, CallPermit, CircuitBreaker};

use crate::persist::AuditPersist;
use crate::record::{AuditEntry, AuditRecord, GENESIS_HASH};

struct ChainState {
    sequence_number: u64,
    last_hash: String,
}

/// Bounded, hash-chained audit sink.
pub struct AuditSink {
    buffer: Mutex<VecDeque<AuditRecord>>,
    buffer_ceiling: usize,
    batch_size: usize,
    dropped: AtomicU64,
    chains: Mutex<HashMap<String, ChainState>>,
    persist: Arc<dyn AuditPersist>,
    breaker: CircuitBreaker,
}

impl AuditSink {
    pub fn new(buffer_ceiling: usize, batch_size: usize, persist: Arc<dyn AuditPersist>) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::new()),
            buffer_ceiling,
            batch_size,
            dropped: AtomicU64::new(0),
            chains: Mutex::new(HashMap::new()),
            persist,
            breaker: CircuitBreaker::new("audit_persist", BreakerConfig::default()),
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Append a new audit record to the chain for `entry.tenant_id` and
    /// push it onto the buffer. If the buffer is at its ceiling, the
    /// oldest buffered record is dropped (and counted) to make room —
    /// audit throughput must never block the decision path that calls
    /// this.
    pub fn enqueue(&self, entry: AuditEntry, now_ms: u64) -> AuditRecord {
        let tenant_id = entry.tenant_id.clone();
        let (sequence_number, previous_hash) = {
            let mut chains = self.chains.lock();
            let state = chains.entry(tenant_id.clone()).or_insert_with(|| ChainState {
                sequence_number: 0,
                last_hash: GENESIS_HASH.to_string(),
            });
            state.sequence_number += 1;
            (state.sequence_number, state.last_hash.clone())
        };

        let record_hash = AuditRecord::compute_hash(&entry, sequence_number, &previous_hash, now_ms);

        {
            let mut chains = self.chains.lock();
            if let Some(state) = chains.get_mut(&tenant_id) {
                state.last_hash = record_hash.clone();
            }
        }

        let record = AuditRecord {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            event_type: entry.event_type,
            severity: entry.severity,
            outcome: entry.outcome,
            actor: entry.actor,
            target: entry.target,
            action: entry.action,
            reason: entry.reason,
            decision_id: entry.decision_id,
            before: entry.before,
            after: entry.after,
            metadata: entry.metadata,
            event_time_ms: entry.event_time_ms,
            sequence_number,
            previous_hash,
            record_hash,
            recorded_at_ms: now_ms,
        };

        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.buffer_ceiling {
            buffer.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(tenant_id = %record.tenant_id, "audit buffer at ceiling, dropped oldest record");
        }
        buffer.push_back(record.clone());
        record
    }

    /// Drain up to `batch_size` records and persist them. On persistence
    /// failure, the batch is re-queued at the head of the buffer in its
    /// original order so a transient outage never loses records (subject
    /// to the ceiling above, which can still drop the oldest entries if
    /// the outage outlasts capacity).
    pub async fn flush(&self) -> usize {
        let batch: Vec<AuditRecord> = {
            let mut buffer = self.buffer.lock();
            let take = self.batch_size.min(buffer.len());
            buffer.drain(..take).collect()
        };

        if batch.is_empty() {
            return 0;
        }

        if self.breaker.before_call() == CallPermit::Rejected {
            self.requeue_at_head(batch);
            return 0;
        }

        match self.persist.persist(&batch).await {
            Ok(()) => {
                self.breaker.on_success();
                batch.len()
            }
            Err(error) => {
                tracing::warn!(error, batch_len = batch.len(), "audit persist failed, re-queueing");
                self.breaker.on_failure();
                let flushed = batch.len();
                self.requeue_at_head(batch);
                let _ = flushed;
                0
            }
        }
    }

    fn requeue_at_head(&self, batch: Vec<AuditRecord>) {
        let mut buffer = self.buffer.lock();
        for record in batch.into_iter().rev() {
            buffer.push_front(record);
        }
    }

    /// Spawn a background task that flushes on a fixed cadence, draining
    /// early whenever the buffer reaches `batch_size` between ticks.
    pub fn spawn_flusher(self: Arc<Self>, flush_interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let poll = flush_interval.min(Duration::from_millis(50));
            let mut last_flush = tokio::time::Instant::now();
            loop {
                tokio::time::sleep(poll).await;
                let due = last_flush.elapsed() >= flush_interval;
                let full = self.buffered_len() >= self.batch_size;
                if due || full {
                    self.flush().await;
                    last_flush = tokio::time::Instant::now();
                }
            }
        })
    }

    /// Flush remaining buffered records on shutdown, bounded to
    /// `max_attempts` rounds so a persistently failing backend cannot hang
    /// process exit.
    pub async fn shutdown(&self, max_attempts: u32) -> usize {
        let mut total_flushed = 0;
        for _ in 0..max_attempts {
            if self.buffered_len() == 0 {
                break;
            }
            let before = self.buffered_len();
            self.flush().await;
            let after = self.buffered_len();
            total_flushed += before.saturating_sub(after);
            if after == before {
                // No progress this round; the backend is still down.
                break;
            }
        }
        total_flushed
    }

    pub async fn query(&self, tenant_id: &str, limit: usize) -> Vec<AuditRecord> {
        self.persist.query(tenant_id, limit.min(1000)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::InMemoryAuditPersist;
    use crate::record::{AuditOutcome, AuditSeverity};

    fn sink(ceiling: usize, batch_size: usize) -> AuditSink {
        AuditSink::new(ceiling, batch_size, Arc::new(InMemoryAuditPersist::new()))
    }

    fn entry(tenant_id: &str, event_type: &str) -> AuditEntry {
        AuditEntry::new(
            tenant_id,
            event_type,
            AuditSeverity::Info,
            AuditOutcome::Success,
            "agent-1",
            "resource-1",
            "allow",
            "test",
            0,
        )
    }

    #[test]
    fn enqueue_produces_increasing_sequence_numbers_per_tenant() {
        let sink = sink(100, 10);
        let a = sink.enqueue(entry("t1", "decision.made"), 0);
        let b = sink.enqueue(entry("t1", "decision.made"), 1);
        assert_eq!(a.sequence_number, 1);
        assert_eq!(b.sequence_number, 2);
        assert_eq!(b.previous_hash, a.record_hash);
    }

    #[test]
    fn separate_tenants_have_independent_chains() {
        let sink = sink(100, 10);
        let a = sink.enqueue(entry("t1", "decision.made"), 0);
        let b = sink.enqueue(entry("t2", "decision.made"), 0);
        assert_eq!(a.sequence_number, 1);
        assert_eq!(b.sequence_number, 1);
        assert_eq!(b.previous_hash, GENESIS_HASH);
    }

    #[test]
    fn buffer_drops_oldest_at_ceiling() {
        let sink = sink(2, 10);
        sink.enqueue(entry("t1", "a"), 0);
        sink.enqueue(entry("t1", "b"), 0);
        sink.enqueue(entry("t1", "c"), 0);
        assert_eq!(sink.buffered_len(), 2);
        assert_eq!(sink.dropped_count(), 1);
    }

    #[tokio::test]
    async fn flush_drains_up_to_batch_size() {
        let sink = sink(100, 2);
        for _ in 0..5 {
            sink.enqueue(entry("t1", "a"), 0);
        }
        let flushed = sink.flush().await;
        assert_eq!(flushed, 2);
        assert_eq!(sink.buffered_len(), 3);
    }

    #[tokio::test]
    async fn shutdown_drains_everything_when_backend_healthy() {
        let sink = sink(100, 2);
        for _ in 0..5 {
            sink.enqueue(entry("t1", "a"), 0);
        }
        let flushed = sink.shutdown(5).await;
        assert_eq!(flushed, 5);
        assert_eq!(sink.buffered_len(), 0);
    }

    #[tokio::test]
    async fn query_round_trips_through_persist() {
        let sink = sink(100, 10);
        sink.enqueue(entry("t1", "decision.made").with_metadata(serde_json::json!({"x": 1})), 0);
        sink.flush().await;
        let records = sink.query("t1", 10).await;
        assert_eq!(records.len(), 1);
    }
}
