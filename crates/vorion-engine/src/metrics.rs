// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Prometheus-compatible metrics surface for the enforcement engine.
//!
//! One [`EngineMetrics`] is owned per [`crate::engine::EnforcementEngine`]
//! and registered into a caller-supplied [`prometheus::Registry`] so a
//! process hosting multiple engines (one per tenant shard, say) does not
//! collide on metric names.

use prometheus::{HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry};

pub struct EngineMetrics {
    pub decisions_total: IntCounterVec,
    pub decision_duration_seconds: HistogramVec,
    pub constraint_evaluations_total: IntCounterVec,
    pub cache_hits_total: IntCounterVec,
    pub cache_misses_total: IntCounterVec,
    pub escalations_total: IntCounterVec,
    pub active_escalations: IntGaugeVec,
    pub cache_size: IntGaugeVec,
}

impl EngineMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let decisions_total = IntCounterVec::new(
            Opts::new("decisions_total", "Total enforcement decisions made"),
            &["tenant", "action", "cached"],
        )?;
        let decision_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "decision_duration_seconds",
                "Enforcement decision wall-clock duration",
            ),
            &["tenant", "action"],
        )?;
        let constraint_evaluations_total = IntCounterVec::new(
            Opts::new("constraint_evaluations_total", "Total constraint evaluations"),
            &["tenant", "type", "passed"],
        )?;
        let cache_hits_total = IntCounterVec::new(
            Opts::new("cache_hits_total", "Decision cache hits"),
            &["tenant"],
        )?;
        let cache_misses_total = IntCounterVec::new(
            Opts::new("cache_misses_total", "Decision cache misses"),
            &["tenant"],
        )?;
        let escalations_total = IntCounterVec::new(
            Opts::new("escalations_total", "Total escalations raised"),
            &["tenant", "rule", "priority"],
        )?;
        let active_escalations = IntGaugeVec::new(
            Opts::new("active_escalations", "Escalations currently pending"),
            &["tenant", "priority"],
        )?;
        let cache_size = IntGaugeVec::new(
            Opts::new("cache_size", "Decision cache entries currently held locally"),
            &["tenant"],
        )?;

        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(decision_duration_seconds.clone()))?;
        registry.register(Box::new(constraint_evaluations_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(escalations_total.clone()))?;
        registry.register(Box::new(active_escalations.clone()))?;
        registry.register(Box::new(cache_size.clone()))?;

        Ok(Self {
            decisions_total,
            decision_duration_seconds,
            constraint_evaluations_total,
            cache_hits_total,
            cache_misses_total,
            escalations_total,
            active_escalations,
            cache_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_name_collisions() {
        let registry = Registry::new();
        assert!(EngineMetrics::new(&registry).is_ok());
    }
}
