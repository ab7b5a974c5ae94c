// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Escalation rules and their two condition forms.
//!
//! The source system this engine is modeled on expresses escalation
//! conditions both as typed records and as free-form strings. Both forms
//! are preserved here: [`EscalationCondition`] for new rules, and
//! [`evaluate_string_condition`] for the substring-matching contract older
//! rule sets depend on.

use vorion_core::types::{ControlAction, TrustTier};

/// Typed escalation condition. Prefer this form for new rules.
#[derive(Debug, Clone)]
pub enum EscalationCondition {
    TrustBelow(TrustTier),
    ActionType(ControlAction),
    PolicyMatch(String),
    Custom(String),
}

/// A single escalation rule, evaluated in priority order by
/// [`crate::engine::EnforcementEngine::decide`]'s escalation-check step.
#[derive(Debug, Clone)]
pub struct EscalationRule {
    pub id: String,
    pub condition: EscalationCondition,
    pub escalate_to: String,
    pub timeout_ms: u64,
    pub priority: i32,
}

/// Everything an escalation condition needs to evaluate against, gathered
/// from the in-flight decision before the final action is settled.
pub struct EscalationEvalContext<'a> {
    pub trust_tier: TrustTier,
    pub current_action: ControlAction,
    pub matched_policy_ids: &'a [String],
}

impl EscalationCondition {
    pub fn matches(&self, ctx: &EscalationEvalContext<'_>) -> bool {
        match self {
            EscalationCondition::TrustBelow(threshold) => ctx.trust_tier < *threshold,
            EscalationCondition::ActionType(action) => ctx.current_action == *action,
            EscalationCondition::PolicyMatch(policy_id) => {
                ctx.matched_policy_ids.iter().any(|id| id == policy_id)
            }
            // TODO: once the string-condition corpus (see
            // evaluate_string_condition) is fully migrated to typed rules,
            // Custom can be removed along with the string path.
            EscalationCondition::Custom(expr) => evaluate_string_condition(expr, ctx),
        }
    }
}

/// Evaluate a free-form string condition (e.g. `"trust_level <= 2"`) against
/// an escalation context using substring matching, exactly as the rule sets
/// this behavior was preserved from expect: a match on any of
/// `trust_level`, `deny`, `limit`, `monitor`, `high_risk`, `sensitive`
/// combined with the corresponding structural check.
pub fn evaluate_string_condition(expr: &str, ctx: &EscalationEvalContext<'_>) -> bool {
    let lower = expr.to_ascii_lowercase();
    if lower.contains("trust_level") {
        // Any tier-comparison expression is treated as "below the entity's
        // current tier" — the exact operator and operand are not parsed,
        // matching the legacy substring contract.
        return ctx.trust_tier < TrustTier::T3;
    }
    if lower.contains("deny") {
        return ctx.current_action == ControlAction::Deny;
    }
    if lower.contains("limit") {
        return ctx.current_action == ControlAction::Limit;
    }
    if lower.contains("monitor") {
        return ctx.current_action == ControlAction::Monitor;
    }
    if lower.contains("high_risk") || lower.contains("sensitive") {
        return ctx.matched_policy_ids.iter().any(|id| {
            let id_lower = id.to_ascii_lowercase();
            id_lower.contains("high_risk") || id_lower.contains("sensitive")
        });
    }
    false
}

/// Run every rule in priority order and return the first match, honoring
/// the deny-never-softened invariant: a rule is only evaluated while
/// `current_action != Deny`.
pub fn first_match<'a>(
    rules: &'a [EscalationRule],
    ctx: &EscalationEvalContext<'_>,
) -> Option<&'a EscalationRule> {
    if ctx.current_action == ControlAction::Deny {
        return None;
    }
    let mut sorted: Vec<&EscalationRule> = rules.iter().collect();
    sorted.sort_by_key(|rule| rule.priority);
    sorted.into_iter().find(|rule| rule.condition.matches(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_below_matches_when_tier_is_lower() {
        let condition = EscalationCondition::TrustBelow(TrustTier::T3);
        let ctx = EscalationEvalContext {
            trust_tier: TrustTier::T1,
            current_action: ControlAction::Allow,
            matched_policy_ids: &[],
        };
        assert!(condition.matches(&ctx));
    }

    #[test]
    fn deny_is_never_softened_to_escalate() {
        let rules = vec![EscalationRule {
            id: "r1".into(),
            condition: EscalationCondition::ActionType(ControlAction::Deny),
            escalate_to: "ops".into(),
            timeout_ms: 1000,
            priority: 0,
        }];
        let ctx = EscalationEvalContext {
            trust_tier: TrustTier::T0,
            current_action: ControlAction::Deny,
            matched_policy_ids: &[],
        };
        assert!(first_match(&rules, &ctx).is_none());
    }

    #[test]
    fn string_condition_matches_limit_keyword() {
        let ctx = EscalationEvalContext {
            trust_tier: TrustTier::T3,
            current_action: ControlAction::Limit,
            matched_policy_ids: &[],
        };
        assert!(evaluate_string_condition("action_type == 'limit'", &ctx));
        assert!(!evaluate_string_condition("action_type == 'monitor'", &ctx));
    }

    #[test]
    fn priority_selects_lowest_first() {
        let rules = vec![
            EscalationRule {
                id: "low-priority".into(),
                condition: EscalationCondition::TrustBelow(TrustTier::T5),
                escalate_to: "ops".into(),
                timeout_ms: 1000,
                priority: 5,
            },
            EscalationRule {
                id: "high-priority".into(),
                condition: EscalationCondition::TrustBelow(TrustTier::T5),
                escalate_to: "security".into(),
                timeout_ms: 1000,
                priority: 0,
            },
        ];
        let ctx = EscalationEvalContext {
            trust_tier: TrustTier::T1,
            current_action: ControlAction::Allow,
            matched_policy_ids: &[],
        };
        let matched = first_match(&rules, &ctx).unwrap();
        assert_eq!(matched.id, "high-priority");
    }
}
