//! Scope evaluation: does a constraint's extra predicates hold for a path?
//!
//! The source-option match is checked by the caller; scope evaluation covers
//! only the scope-specific predicates (route conditions, external
//! conditions).

use pathrule_core::{Constraint, ConstraintScope, ExternalContext, PathView};
use serde::{Deserialize, Serialize};

use crate::condition::evaluate_conditions;

/// Why a scope decision came out the way it did.
///
/// A closed enum with stable kebab-case wire names so callers and tests can
/// assert on it; never prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeReason {
    /// Global scope always applies.
    Global,
    /// Every route condition matched the path.
    RouteMatched,
    /// At least one route condition did not match.
    RouteMismatch,
    /// Route conditions matched and external conditions held.
    ConditionsMatched,
    /// External conditions did not hold.
    ConditionsFailed,
}

/// Outcome of a scope evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDecision {
    pub applies: bool,
    pub reason: ScopeReason,
}

impl ScopeDecision {
    fn applies(reason: ScopeReason) -> Self {
        Self {
            applies: true,
            reason,
        }
    }

    fn skipped(reason: ScopeReason) -> Self {
        Self {
            applies: false,
            reason,
        }
    }
}

/// Decides whether a constraint's scope conditions hold for a path or
/// in-progress selection.
///
/// Route conditions match only against a confirmed choice: a step with no
/// selection yet counts as a mismatch. An empty route condition list
/// matches.
pub fn evaluate_scope<P: PathView>(
    constraint: &Constraint,
    path: &P,
    ctx: &ExternalContext,
) -> ScopeDecision {
    match constraint.scope {
        ConstraintScope::Global => ScopeDecision::applies(ScopeReason::Global),
        ConstraintScope::RouteBased => {
            if routes_match(constraint, path) {
                ScopeDecision::applies(ScopeReason::RouteMatched)
            } else {
                ScopeDecision::skipped(ScopeReason::RouteMismatch)
            }
        }
        ConstraintScope::ConditionalRoute => {
            if !routes_match(constraint, path) {
                ScopeDecision::skipped(ScopeReason::RouteMismatch)
            } else if !evaluate_conditions(&constraint.external_conditions, ctx) {
                ScopeDecision::skipped(ScopeReason::ConditionsFailed)
            } else {
                ScopeDecision::applies(ScopeReason::ConditionsMatched)
            }
        }
    }
}

fn routes_match<P: PathView>(constraint: &Constraint, path: &P) -> bool {
    constraint
        .route_conditions
        .iter()
        .all(|rc| path.selects(rc.step_index, &rc.option_id))
}
