// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Diffing two decisions — typically a snapshot's original decision
//! against the decision produced by replaying it — into a classified,
//! severity-ranked set of [`Difference`] records.

use std::collections::HashSet;

use vorion_core::types::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DifferenceKind {
    Decision,
    PolicyApplied,
    PolicyMissing,
    TrustScore,
    TrustTier,
    Timing,
    EvaluationOrder,
    Constraint,
    Metadata,
}

#[derive(Debug, Clone)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub severity: Severity,
    pub description: String,
}

/// Fraction by which a replay's duration may exceed the original's before
/// it is flagged, absent an explicit override.
pub const DEFAULT_TIMING_WARN_FRACTION: f64 = 0.2;

pub struct Comparator {
    timing_warn_fraction: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self { timing_warn_fraction: DEFAULT_TIMING_WARN_FRACTION }
    }
}

impl Comparator {
    pub fn new(timing_warn_fraction: f64) -> Self {
        Self { timing_warn_fraction }
    }

    /// Compare an original decision against a replayed one, returning
    /// every observed difference ordered most-severe-first.
    pub fn compare(&self, original: &Decision, replayed: &Decision) -> Vec<Difference> {
        let mut differences = Vec::new();

        if original.final_action != replayed.final_action {
            differences.push(Difference {
                kind: DifferenceKind::Decision,
                severity: Severity::Critical,
                description: format!(
                    "final action changed from {} to {}",
                    original.final_action.as_str(),
                    replayed.final_action.as_str()
                ),
            });
        }

        self.compare_policies(original, replayed, &mut differences);

        if original.trust_tier != replayed.trust_tier {
            differences.push(Difference {
                kind: DifferenceKind::TrustTier,
                severity: Severity::Warning,
                description: format!(
                    "trust tier changed from {:?} to {:?}",
                    original.trust_tier, replayed.trust_tier
                ),
            });
        }

        if original.trust_score.effective != replayed.trust_score.effective {
            differences.push(Difference {
                kind: DifferenceKind::TrustScore,
                severity: Severity::Info,
                description: format!(
                    "effective trust score changed from {} to {}",
                    original.trust_score.effective, replayed.trust_score.effective
                ),
            });
        }

        self.compare_constraints(original, replayed, &mut differences);
        self.compare_timing(original, replayed, &mut differences);

        differences.sort_by(|a, b| b.severity.cmp(&a.severity));
        differences
    }

    fn compare_policies(&self, original: &Decision, replayed: &Decision, out: &mut Vec<Difference>) {
        let original_ids: HashSet<&str> =
            original.policies_evaluated.iter().map(|reference| reference.policy_id.as_str()).collect();
        let replayed_ids: HashSet<&str> =
            replayed.policies_evaluated.iter().map(|reference| reference.policy_id.as_str()).collect();

        for missing in original_ids.difference(&replayed_ids) {
            out.push(Difference {
                kind: DifferenceKind::PolicyMissing,
                severity: Severity::Critical,
                description: format!("policy {missing} was evaluated originally but not on replay"),
            });
        }
        for added in replayed_ids.difference(&original_ids) {
            out.push(Difference {
                kind: DifferenceKind::PolicyApplied,
                severity: Severity::Warning,
                description: format!("policy {added} was evaluated on replay but not originally"),
            });
        }
    }

    fn compare_constraints(&self, original: &Decision, replayed: &Decision, out: &mut Vec<Difference>) {
        let original_failed: HashSet<&str> = original
            .constraints
            .iter()
            .filter(|constraint| !constraint.passed)
            .map(|constraint| constraint.constraint_id.as_str())
            .collect();
        let replayed_failed: HashSet<&str> = replayed
            .constraints
            .iter()
            .filter(|constraint| !constraint.passed)
            .map(|constraint| constraint.constraint_id.as_str())
            .collect();

        if original_failed != replayed_failed {
            out.push(Difference {
                kind: DifferenceKind::Constraint,
                severity: Severity::Warning,
                description: "set of failed constraints differs between original and replay".into(),
            });
        }

        if original.constraints.len() != replayed.constraints.len() {
            out.push(Difference {
                kind: DifferenceKind::EvaluationOrder,
                severity: Severity::Info,
                description: format!(
                    "constraint count changed from {} to {}",
                    original.constraints.len(),
                    replayed.constraints.len()
                ),
            });
        }
    }

    fn compare_timing(&self, original: &Decision, replayed: &Decision, out: &mut Vec<Difference>) {
        if original.duration_ms <= 0.0 {
            return;
        }
        let delta = (replayed.duration_ms - original.duration_ms) / original.duration_ms;
        if delta.abs() > self.timing_warn_fraction {
            out.push(Difference {
                kind: DifferenceKind::Timing,
                severity: Severity::Warning,
                description: format!(
                    "decision duration changed by {:.1}% ({:.3}ms to {:.3}ms)",
                    delta * 100.0,
                    original.duration_ms,
                    replayed.duration_ms
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vorion_core::types::{ConstraintKind, ConstraintResult, ControlAction, PolicyReference, TrustScore, TrustTier};

    fn base_decision() -> Decision {
        Decision {
            id: "d1".into(),
            intent_id: "intent-1".into(),
            tenant_id: "tenant-1".into(),
            final_action: ControlAction::Allow,
            reason: "ok".into(),
            confidence: 1.0,
            constraints: vec![ConstraintResult {
                constraint_id: "c1".into(),
                kind: ConstraintKind::TrustLevel,
                passed: true,
                action: ControlAction::Allow,
                reason: "ok".into(),
                details: BTreeMap::new(),
                duration_ms: 1.0,
            }],
            policies_evaluated: vec![PolicyReference {
                policy_id: "p1".into(),
                namespace: "default".into(),
                version: 1,
                checksum: "abc".into(),
            }],
            trust_score: TrustScore { raw: 500, effective: 500 },
            trust_tier: TrustTier::T3,
            decided_at_ms: 0,
            duration_ms: 10.0,
            cached: false,
            escalation: None,
            trace_id: "t1".into(),
            span_id: "s1".into(),
        }
    }

    #[test]
    fn identical_decisions_produce_no_differences() {
        let original = base_decision();
        let replayed = base_decision();
        assert!(Comparator::default().compare(&original, &replayed).is_empty());
    }

    #[test]
    fn action_mismatch_is_always_critical() {
        let original = base_decision();
        let mut replayed = base_decision();
        replayed.final_action = ControlAction::Deny;
        let differences = Comparator::default().compare(&original, &replayed);
        assert_eq!(differences[0].kind, DifferenceKind::Decision);
        assert_eq!(differences[0].severity, Severity::Critical);
    }

    #[test]
    fn timing_within_threshold_is_not_flagged() {
        let original = base_decision();
        let mut replayed = base_decision();
        replayed.duration_ms = 11.0;
        assert!(Comparator::default().compare(&original, &replayed).is_empty());
    }

    #[test]
    fn timing_beyond_threshold_is_warning() {
        let original = base_decision();
        let mut replayed = base_decision();
        replayed.duration_ms = 20.0;
        let differences = Comparator::default().compare(&original, &replayed);
        assert!(differences.iter().any(|d| d.kind == DifferenceKind::Timing && d.severity == Severity::Warning));
    }

    #[test]
    fn missing_policy_on_replay_is_critical() {
        let original = base_decision();
        let mut replayed = base_decision();
        replayed.policies_evaluated.clear();
        let differences = Comparator::default().compare(&original, &replayed);
        assert!(differences.iter().any(|d| d.kind == DifferenceKind::PolicyMissing && d.severity == Severity::Critical));
    }
}
