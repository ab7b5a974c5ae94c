// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! The decision path: [`EnforcementEngine::decide`] turns an
//! [`EnforcementContext`] into a [`Decision`], following the eight-step
//! algorithm this crate is built around: cache probe, constraint
//! evaluation, action resolution, escalation check, confidence scoring,
//! decision emission, cache set, and a non-blocking audit enqueue.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use uuid::Uuid;

use vorion_audit::{AuditEntry, AuditOutcome, AuditSeverity, AuditSink};
use vorion_cache::DecisionCache;
use vorion_core::circuit_breaker::{BreakerConfig, CallPermit, CircuitBreaker};
use vorion_core::config::Config;
use vorion_core::error::VorionError;
use vorion_core::policy::BasisPolicyEngine;
use vorion_core::storage::Storage;
use vorion_core::trust::{TrustAuditEvent, TrustAuditHook, TrustAuditSeverity, TrustKernel};
use vorion_core::types::{
    ConstraintKind, ConstraintResult, ControlAction, Decision, Entity, EscalationRecord,
    EscalationStatus, EscalationTransition, Intent, PolicyReference,
};

use crate::escalation::{EscalationEvalContext, EscalationRule};
use crate::evaluator::RuleEvaluator;
use crate::metrics::EngineMetrics;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Everything [`EnforcementEngine::decide`] needs to evaluate one intent.
///
/// `rule_evaluation` is left to the engine to populate via the configured
/// [`RuleEvaluator`] unless a caller already has one (e.g. replay, which
/// restores a frozen evaluation rather than re-running it).
pub struct EnforcementContext {
    pub intent: Intent,
    pub entity: Entity,
    pub environment: BTreeMap<String, Value>,
    pub required_tier: Option<vorion_core::types::TrustTier>,
    pub policy_id: Option<String>,
    pub escalation_rules: Vec<EscalationRule>,
    pub use_cache: bool,
}

/// An escalation created during [`EnforcementEngine::decide`], held until
/// [`EnforcementEngine::resolve_escalation`] closes it out. Carries the
/// fields [`EscalationRecord`] itself doesn't: which tenant raised it and
/// at what priority, both needed for metrics and audit once resolved.
struct TrackedEscalation {
    tenant_id: String,
    priority: i32,
    record: EscalationRecord,
}

/// Forwards [`vorion_core::trust::TrustKernel`] audit events (score
/// clamps, integrity violations, identity migrations) into the engine's
/// own [`AuditSink`], under a fixed `"system"` tenant since trust-kernel
/// events are not scoped to the tenant of whichever intent happened to be
/// in flight when they fired.
struct TrustAuditBridge {
    audit: Arc<AuditSink>,
}

impl TrustAuditHook for TrustAuditBridge {
    fn record(&self, event: TrustAuditEvent) {
        let severity = match event.severity {
            TrustAuditSeverity::Info => AuditSeverity::Info,
            TrustAuditSeverity::Warning => AuditSeverity::Warning,
            TrustAuditSeverity::Critical => AuditSeverity::Critical,
        };
        let now = now_ms();
        let entry = AuditEntry::new(
            "system",
            event.event_type,
            severity,
            AuditOutcome::Success,
            "trust_kernel",
            event.entity_id,
            event.event_type,
            event.detail,
            now,
        );
        self.audit.enqueue(entry, now);
    }
}

/// The decision path itself.
pub struct EnforcementEngine<S: Storage> {
    trust_kernel: Mutex<TrustKernel<S>>,
    policy_engine: Mutex<BasisPolicyEngine>,
    evaluator: Arc<dyn RuleEvaluator>,
    cache: Option<Arc<DecisionCache>>,
    audit: Option<Arc<AuditSink>>,
    config: Config,
    breaker: CircuitBreaker,
    metrics: Option<Arc<EngineMetrics>>,
    escalations: Mutex<HashMap<String, TrackedEscalation>>,
}

impl<S: Storage> EnforcementEngine<S> {
    pub fn new(
        storage: S,
        evaluator: Arc<dyn RuleEvaluator>,
        cache: Option<Arc<DecisionCache>>,
        audit: Option<Arc<AuditSink>>,
        config: Config,
        metrics: Option<Arc<EngineMetrics>>,
    ) -> Self {
        let breaker_config = BreakerConfig {
            failure_threshold: config.breaker_failure_threshold,
            success_threshold: config.breaker_success_threshold,
            reset_timeout: std::time::Duration::from_millis(config.breaker_reset_timeout_ms),
            monitor_window: std::time::Duration::from_millis(config.breaker_monitor_window_ms),
        };
        let mut trust_kernel = TrustKernel::new(storage);
        if let Some(audit) = &audit {
            trust_kernel = trust_kernel.with_audit_hook(Arc::new(TrustAuditBridge { audit: audit.clone() }));
        }
        Self {
            trust_kernel: Mutex::new(trust_kernel),
            policy_engine: Mutex::new(BasisPolicyEngine::new()),
            evaluator,
            cache,
            audit,
            config,
            breaker: CircuitBreaker::new("enforcement_engine", breaker_config),
            metrics,
            escalations: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy_engine(&self) -> std::sync::MutexGuard<'_, BasisPolicyEngine> {
        self.policy_engine.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    pub fn trust_kernel(&self) -> std::sync::MutexGuard<'_, TrustKernel<S>> {
        self.trust_kernel.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Run the eight-step decision algorithm. Never panics and never
    /// returns an error — every failure mode resolves to a fallback
    /// [`Decision`] with a reason naming what went wrong.
    pub async fn decide(&self, ctx: EnforcementContext) -> Decision {
        let start_ms = now_ms();

        // Step 0: an intent claiming a tenant other than the one its
        // entity is sealed to is denied outright, before cache lookup or
        // any rule evaluation runs.
        if ctx.intent.tenant_id != ctx.entity.context_binding.tenant_id {
            let decision = self.tenant_mismatch_decision(&ctx, start_ms);
            self.enqueue_audit(&ctx, &decision, AuditSeverity::Critical);
            return decision;
        }

        // Step 1: cache probe.
        if ctx.use_cache {
            if let Some(cache) = &self.cache {
                if let Some(mut cached) = cache.get(&ctx.intent, ctx.entity.trust_tier).await {
                    cached.cached = true;
                    if let Some(metrics) = &self.metrics {
                        metrics.cache_hits_total.with_label_values(&[&ctx.intent.tenant_id]).inc();
                        metrics
                            .cache_size
                            .with_label_values(&[&ctx.intent.tenant_id])
                            .set(cache.local_len() as i64);
                    }
                    self.record_metrics(&cached, true);
                    return cached;
                } else if let Some(metrics) = &self.metrics {
                    metrics.cache_misses_total.with_label_values(&[&ctx.intent.tenant_id]).inc();
                }
            }
        }

        if self.breaker.before_call() == CallPermit::Rejected {
            let decision = self.fallback_decision(&ctx, "enforcement circuit breaker open", start_ms);
            self.enqueue_audit(&ctx, &decision, AuditSeverity::Warning);
            return decision;
        }

        let rule_evaluation = match self.evaluator.evaluate(&ctx.intent, &ctx.entity).await {
            Ok(result) => {
                self.breaker.on_success();
                result
            }
            Err(error) => {
                self.breaker.on_failure();
                let decision = self.fallback_decision(
                    &ctx,
                    &format!("rule evaluator failed: {error}"),
                    start_ms,
                );
                self.enqueue_audit(&ctx, &decision, AuditSeverity::Warning);
                return decision;
            }
        };

        // Step 2: constraint evaluation.
        let mut constraints = Vec::new();

        if let Some(required_tier) = ctx.required_tier {
            let passed = ctx.entity.trust_tier >= required_tier;
            constraints.push(ConstraintResult {
                constraint_id: "trust-level".into(),
                kind: ConstraintKind::TrustLevel,
                passed,
                action: if passed { ControlAction::Allow } else { ControlAction::Deny },
                reason: if passed {
                    "trust tier satisfies minimum requirement".into()
                } else {
                    format!(
                        "trust level {:?} below required {:?}",
                        ctx.entity.trust_tier, required_tier
                    )
                },
                details: BTreeMap::new(),
                duration_ms: 0.0,
            });
        }

        let mut policies_evaluated = Vec::new();
        if let Some(policy_id) = &ctx.policy_id {
            let matched_refs: Vec<&str> =
                rule_evaluation.matched_rule_ids.iter().map(String::as_str).collect();
            let (action, version, checksum) = {
                let engine = self.policy_engine();
                let action = engine.resolve(
                    policy_id,
                    &ctx.entity.id,
                    &ctx.intent.intent_type,
                    ctx.entity.trust_tier,
                    &matched_refs,
                    start_ms,
                );
                let policy = engine.get(policy_id);
                let version = policy.map(|policy| policy.version).unwrap_or(0);
                let checksum = policy.map(|policy| policy.checksum.clone()).unwrap_or_default();
                (action, version, checksum)
            };
            constraints.push(ConstraintResult {
                constraint_id: format!("policy:{policy_id}"),
                kind: ConstraintKind::PolicyRule,
                passed: action == ControlAction::Allow,
                action,
                reason: format!("policy '{policy_id}' resolved to {}", action.as_str()),
                details: BTreeMap::new(),
                duration_ms: 0.0,
            });
            policies_evaluated.push(PolicyReference {
                policy_id: policy_id.clone(),
                namespace: "default".into(),
                version,
                checksum,
            });
        }

        for rule_id in &rule_evaluation.matched_rule_ids {
            constraints.push(ConstraintResult {
                constraint_id: format!("rule:{rule_id}"),
                kind: ConstraintKind::PolicyRule,
                passed: true,
                action: ControlAction::Allow,
                reason: format!("rule '{rule_id}' matched"),
                details: BTreeMap::new(),
                duration_ms: 0.0,
            });
        }

        // Step 3: action resolution.
        let failed_actions: Vec<ControlAction> = constraints
            .iter()
            .filter(|result| !result.passed)
            .map(|result| result.action)
            .collect();

        let mut action = if !failed_actions.is_empty() {
            vorion_core::policy::most_restrictive(&failed_actions)
        } else {
            rule_evaluation.final_action.unwrap_or(ControlAction::Allow)
        };

        // Step 4: escalation check. A current deny is never softened.
        let eval_ctx = EscalationEvalContext {
            trust_tier: ctx.entity.trust_tier,
            current_action: action,
            matched_policy_ids: &rule_evaluation.matched_rule_ids,
        };
        let mut escalation_meta: Option<(String, i32)> = None;
        let escalation = crate::escalation::first_match(&ctx.escalation_rules, &eval_ctx).map(|rule| {
            action = ControlAction::Escalate;
            escalation_meta = Some((rule.id.clone(), rule.priority));
            EscalationRecord {
                id: Uuid::new_v4().to_string(),
                intent_id: ctx.intent.id.clone(),
                reason: format!("escalation rule '{}' matched", rule.id),
                escalate_to: rule.escalate_to.clone(),
                timeout_ms: rule.timeout_ms,
                status: EscalationStatus::Pending,
                created_at_ms: start_ms,
            }
        });

        // Step 5: confidence.
        let mut confidence = 1.0_f64;
        if constraints.is_empty() {
            confidence *= 0.5;
        } else if constraints.iter().any(|c| c.passed) && constraints.iter().any(|c| !c.passed) {
            confidence *= 0.8;
        }
        let total_duration_ms: f64 = constraints.iter().map(|c| c.duration_ms).sum();
        if total_duration_ms > 1000.0 {
            confidence *= 0.9;
        }
        confidence = confidence.clamp(0.0, 1.0);

        // Step 6: emit decision.
        let decided_at_ms = now_ms();
        let decision = Decision {
            id: Uuid::new_v4().to_string(),
            intent_id: ctx.intent.id.clone(),
            tenant_id: ctx.intent.tenant_id.clone(),
            final_action: action,
            reason: decision_reason(action, &constraints, &escalation),
            confidence,
            constraints,
            policies_evaluated,
            trust_score: ctx.entity.trust_score,
            trust_tier: ctx.entity.trust_tier,
            decided_at_ms,
            duration_ms: (decided_at_ms.saturating_sub(start_ms)) as f64,
            cached: false,
            escalation,
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
        };

        self.record_metrics(&decision, false);

        if let (Some(escalation), Some((rule_id, priority))) = (&decision.escalation, &escalation_meta) {
            self.escalations.lock().unwrap_or_else(|poison| poison.into_inner()).insert(
                escalation.id.clone(),
                TrackedEscalation {
                    tenant_id: ctx.intent.tenant_id.clone(),
                    priority: *priority,
                    record: escalation.clone(),
                },
            );
            if let Some(metrics) = &self.metrics {
                let priority_label = priority.to_string();
                metrics
                    .escalations_total
                    .with_label_values(&[&ctx.intent.tenant_id, rule_id, &priority_label])
                    .inc();
                metrics
                    .active_escalations
                    .with_label_values(&[&ctx.intent.tenant_id, &priority_label])
                    .inc();
            }
        }

        // Step 7: cache set, skipped for pending escalations.
        let is_pending_escalation = decision
            .escalation
            .as_ref()
            .map(|escalation| escalation.status == EscalationStatus::Pending)
            .unwrap_or(false);
        if ctx.use_cache && !is_pending_escalation {
            if let Some(cache) = &self.cache {
                cache.set(&ctx.intent, ctx.entity.trust_tier, decision.clone()).await;
                if let Some(metrics) = &self.metrics {
                    metrics
                        .cache_size
                        .with_label_values(&[&ctx.intent.tenant_id])
                        .set(cache.local_len() as i64);
                }
            }
        }

        // Step 8: audit enqueue, never awaited.
        self.enqueue_audit(&ctx, &decision, severity_for_action(decision.final_action));

        decision
    }

    /// Resolve a pending escalation created by a prior [`Self::decide`]
    /// call to a terminal status, persisting the transition and enqueuing
    /// an audit record for it. Fails if the escalation is unknown or has
    /// already left the `pending` state.
    pub fn resolve_escalation(
        &self,
        escalation_id: &str,
        next_status: EscalationStatus,
        at_ms: u64,
    ) -> Result<EscalationTransition, VorionError> {
        let (transition, tenant_id, priority) = {
            let mut escalations = self.escalations.lock().unwrap_or_else(|poison| poison.into_inner());
            let tracked = escalations
                .get_mut(escalation_id)
                .ok_or_else(|| VorionError::NotFound(format!("escalation '{escalation_id}' not found")))?;
            let transition = tracked.record.transition(next_status, at_ms).map_err(|current| {
                VorionError::InvalidState(format!(
                    "escalation '{escalation_id}' cannot transition from {current:?} to {next_status:?}"
                ))
            })?;
            (transition, tracked.tenant_id.clone(), tracked.priority)
        };

        if let Some(metrics) = &self.metrics {
            metrics
                .active_escalations
                .with_label_values(&[&tenant_id, &priority.to_string()])
                .dec();
        }

        if let Some(audit) = &self.audit {
            let entry = AuditEntry::new(
                tenant_id,
                "escalation.transitioned",
                AuditSeverity::Info,
                AuditOutcome::Success,
                "enforcement_engine",
                escalation_id,
                format!("{:?}", transition.to),
                format!("escalation transitioned from {:?} to {:?}", transition.from, transition.to),
                at_ms,
            );
            audit.enqueue(entry, at_ms);
        }

        Ok(transition)
    }

    fn tenant_mismatch_decision(&self, ctx: &EnforcementContext, start_ms: u64) -> Decision {
        let error = VorionError::TenantMismatch {
            claimed: ctx.intent.tenant_id.clone(),
            bound: ctx.entity.context_binding.tenant_id.clone(),
        };
        let decided_at_ms = now_ms();
        Decision {
            id: Uuid::new_v4().to_string(),
            intent_id: ctx.intent.id.clone(),
            tenant_id: ctx.intent.tenant_id.clone(),
            final_action: ControlAction::Deny,
            reason: error.to_string(),
            confidence: 1.0,
            constraints: Vec::new(),
            policies_evaluated: Vec::new(),
            trust_score: ctx.entity.trust_score,
            trust_tier: ctx.entity.trust_tier,
            decided_at_ms,
            duration_ms: (decided_at_ms.saturating_sub(start_ms)) as f64,
            cached: false,
            escalation: None,
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
        }
    }

    fn fallback_decision(&self, ctx: &EnforcementContext, reason: &str, start_ms: u64) -> Decision {
        let decided_at_ms = now_ms();
        Decision {
            id: Uuid::new_v4().to_string(),
            intent_id: ctx.intent.id.clone(),
            tenant_id: ctx.intent.tenant_id.clone(),
            final_action: ControlAction::Deny,
            reason: reason.to_string(),
            confidence: 0.3,
            constraints: Vec::new(),
            policies_evaluated: Vec::new(),
            trust_score: ctx.entity.trust_score,
            trust_tier: ctx.entity.trust_tier,
            decided_at_ms,
            duration_ms: (decided_at_ms.saturating_sub(start_ms)) as f64,
            cached: false,
            escalation: None,
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
        }
    }

    fn enqueue_audit(&self, ctx: &EnforcementContext, decision: &Decision, severity: AuditSeverity) {
        if let Some(audit) = &self.audit {
            let outcome = match decision.final_action {
                ControlAction::Deny | ControlAction::Terminate => AuditOutcome::Failure,
                _ => AuditOutcome::Success,
            };
            let metadata = serde_json::to_value(decision).unwrap_or(Value::Null);
            let entry = AuditEntry::new(
                decision.tenant_id.clone(),
                "decision.made",
                severity,
                outcome,
                ctx.entity.id.clone(),
                ctx.intent.intent_type.clone(),
                decision.final_action.as_str(),
                decision.reason.clone(),
                decision.decided_at_ms,
            )
            .with_decision_id(decision.id.clone())
            .with_metadata(metadata);
            audit.enqueue(entry, decision.decided_at_ms);
        }
    }

    fn record_metrics(&self, decision: &Decision, cached: bool) {
        if let Some(metrics) = &self.metrics {
            let cached_label = if cached { "true" } else { "false" };
            metrics
                .decisions_total
                .with_label_values(&[&decision.tenant_id, decision.final_action.as_str(), cached_label])
                .inc();
            metrics
                .decision_duration_seconds
                .with_label_values(&[&decision.tenant_id, decision.final_action.as_str()])
                .observe(decision.duration_ms / 1000.0);
            for constraint in &decision.constraints {
                metrics
                    .constraint_evaluations_total
                    .with_label_values(&[
                        &decision.tenant_id,
                        constraint_kind_label(constraint.kind),
                        if constraint.passed { "true" } else { "false" },
                    ])
                    .inc();
            }
        }
    }
}

fn severity_for_action(action: ControlAction) -> AuditSeverity {
    match action {
        ControlAction::Deny | ControlAction::Terminate => AuditSeverity::Warning,
        ControlAction::Escalate => AuditSeverity::Warning,
        _ => AuditSeverity::Info,
    }
}

fn constraint_kind_label(kind: ConstraintKind) -> &'static str {
    match kind {
        ConstraintKind::TrustLevel => "trust_level",
        ConstraintKind::PolicyRule => "policy_rule",
        ConstraintKind::RateLimit => "rate_limit",
        ConstraintKind::TimeWindow => "time_window",
        ConstraintKind::GeoRestriction => "geo_restriction",
        ConstraintKind::Custom => "custom",
    }
}

fn decision_reason(
    action: ControlAction,
    constraints: &[ConstraintResult],
    escalation: &Option<EscalationRecord>,
) -> String {
    if let Some(escalation) = escalation {
        return escalation.reason.clone();
    }
    if let Some(failed) = constraints.iter().find(|c| !c.passed) {
        return failed.reason.clone();
    }
    format!("resolved to {}", action.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::StaticRuleEvaluator;
    use vorion_core::storage::InMemoryStorage;
    use vorion_core::types::{
        AgentRole, ContextBinding, ContextBindingType, CreationInfo, CreationType, EntityType,
        TrustScore, TrustTier,
    };

    fn sample_intent() -> Intent {
        Intent {
            id: "intent-1".into(),
            tenant_id: "tenant-1".into(),
            entity_id: "agent-1".into(),
            intent_type: "data.read".into(),
            goal: "read a report".into(),
            context: BTreeMap::new(),
            priority: 0,
            created_at_ms: 0,
        }
    }

    fn sample_entity(tier: TrustTier) -> Entity {
        Entity {
            id: "agent-1".into(),
            entity_type: EntityType::Agent,
            trust_score: TrustScore { raw: 500, effective: 500 },
            trust_tier: tier,
            role: AgentRole::RL5,
            context_binding: ContextBinding {
                binding_type: ContextBindingType::Enterprise,
                tenant_id: "tenant-1".into(),
                max_tier: TrustTier::T4,
                integrity_hash: "x".into(),
                sealed_at_ms: 0,
            },
            creation_info: CreationInfo {
                creation_type: CreationType::Fresh,
                parent_id: None,
                created_at_ms: 0,
                modifier: 0,
                integrity_hash: "x".into(),
            },
        }
    }

    fn engine() -> EnforcementEngine<InMemoryStorage> {
        EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::allow()),
            None,
            None,
            Config::default(),
            None,
        )
    }

    #[tokio::test]
    async fn allow_happy_path() {
        let engine = engine();
        let ctx = EnforcementContext {
            intent: sample_intent(),
            entity: sample_entity(TrustTier::T3),
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: None,
            escalation_rules: Vec::new(),
            use_cache: false,
        };
        let decision = engine.decide(ctx).await;
        assert_eq!(decision.final_action, ControlAction::Allow);
        assert_eq!(decision.confidence, 1.0);
        assert!(!decision.cached);
    }

    #[tokio::test]
    async fn trust_floor_denies_below_required_tier() {
        let engine = engine();
        let ctx = EnforcementContext {
            intent: sample_intent(),
            entity: sample_entity(TrustTier::T3),
            environment: BTreeMap::new(),
            required_tier: Some(TrustTier::T4),
            policy_id: None,
            escalation_rules: Vec::new(),
            use_cache: false,
        };
        let decision = engine.decide(ctx).await;
        assert_eq!(decision.final_action, ControlAction::Deny);
        assert!(decision.reason.contains("trust level"));
    }

    #[tokio::test]
    async fn mismatched_tenant_is_denied_before_rule_evaluation() {
        let engine = EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::new(crate::evaluator::RuleEvaluation {
                matched_rule_ids: Vec::new(),
                final_action: None,
                reason: "should never run".into(),
            })),
            None,
            None,
            Config::default(),
            None,
        );
        let mut intent = sample_intent();
        intent.tenant_id = "tenant-attacker".into();
        let ctx = EnforcementContext {
            intent,
            entity: sample_entity(TrustTier::T5),
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: None,
            escalation_rules: Vec::new(),
            use_cache: false,
        };
        let decision = engine.decide(ctx).await;
        assert_eq!(decision.final_action, ControlAction::Deny);
        assert!(decision.reason.contains("tenant mismatch"));
        assert!(decision.constraints.is_empty());
    }

    #[tokio::test]
    async fn mixed_constraint_escalation_upgrades_limit_to_escalate() {
        use crate::escalation::{EscalationCondition, EscalationRule};

        let engine = EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::new(crate::evaluator::RuleEvaluation {
                matched_rule_ids: vec!["limit-rule".into()],
                final_action: Some(ControlAction::Limit),
                reason: "limit rule fired".into(),
            })),
            None,
            None,
            Config::default(),
            None,
        );
        let ctx = EnforcementContext {
            intent: sample_intent(),
            entity: sample_entity(TrustTier::T3),
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: None,
            escalation_rules: vec![EscalationRule {
                id: "esc-on-limit".into(),
                condition: EscalationCondition::ActionType(ControlAction::Limit),
                escalate_to: "ops-team".into(),
                timeout_ms: 60_000,
                priority: 0,
            }],
            use_cache: false,
        };
        let decision = engine.decide(ctx).await;
        assert_eq!(decision.final_action, ControlAction::Escalate);
        assert!(decision.escalation.is_some());
        assert!(!decision.cached);
    }

    #[tokio::test]
    async fn deny_is_never_upgraded_to_escalate() {
        use crate::escalation::{EscalationCondition, EscalationRule};

        let engine = engine();
        let ctx = EnforcementContext {
            intent: sample_intent(),
            entity: sample_entity(TrustTier::T0),
            environment: BTreeMap::new(),
            required_tier: Some(TrustTier::T4),
            policy_id: None,
            escalation_rules: vec![EscalationRule {
                id: "esc-on-deny".into(),
                condition: EscalationCondition::ActionType(ControlAction::Deny),
                escalate_to: "ops-team".into(),
                timeout_ms: 60_000,
                priority: 0,
            }],
            use_cache: false,
        };
        let decision = engine.decide(ctx).await;
        assert_eq!(decision.final_action, ControlAction::Deny);
        assert!(decision.escalation.is_none());
    }

    #[tokio::test]
    async fn resolving_an_escalation_transitions_it_and_audits() {
        use crate::escalation::{EscalationCondition, EscalationRule};

        let engine = EnforcementEngine::new(
            InMemoryStorage::new(),
            Arc::new(StaticRuleEvaluator::new(crate::evaluator::RuleEvaluation {
                matched_rule_ids: vec!["limit-rule".into()],
                final_action: Some(ControlAction::Limit),
                reason: "limit rule fired".into(),
            })),
            None,
            None,
            Config::default(),
            None,
        );
        let ctx = EnforcementContext {
            intent: sample_intent(),
            entity: sample_entity(TrustTier::T3),
            environment: BTreeMap::new(),
            required_tier: None,
            policy_id: None,
            escalation_rules: vec![EscalationRule {
                id: "esc-on-limit".into(),
                condition: EscalationCondition::ActionType(ControlAction::Limit),
                escalate_to: "ops-team".into(),
                timeout_ms: 60_000,
                priority: 1,
            }],
            use_cache: false,
        };
        let decision = engine.decide(ctx).await;
        let escalation_id = decision.escalation.unwrap().id;

        let transition = engine
            .resolve_escalation(&escalation_id, EscalationStatus::Approved, 1_000)
            .unwrap();
        assert_eq!(transition.from, EscalationStatus::Pending);
        assert_eq!(transition.to, EscalationStatus::Approved);

        let err = engine.resolve_escalation(&escalation_id, EscalationStatus::Rejected, 2_000);
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn resolving_an_unknown_escalation_fails() {
        let engine = engine();
        let result = engine.resolve_escalation("missing", EscalationStatus::Approved, 0);
        assert!(result.is_err());
    }
}
