//! Exception resolution: per-path overrides of a constraint's action.

use pathrule_core::{Constraint, ExceptionRule, ExternalContext, PathView};
use tracing::debug;

use crate::condition::evaluate_conditions;

/// Finds the exception that overrides the constraint for this path, if any.
///
/// Exceptions are tried highest-priority first (ties keep their declared
/// order); the first whose path predicates all match AND whose external
/// conditions all hold wins. Its action replaces the constraint's action
/// for this evaluation, and its explicit targets (when non-empty) replace
/// the resolved target set. No match leaves the base action standing.
pub fn resolve_exception<'c, P: PathView>(
    constraint: &'c Constraint,
    path: &P,
    ctx: &ExternalContext,
) -> Option<&'c ExceptionRule> {
    if constraint.exceptions.is_empty() {
        return None;
    }

    let mut candidates: Vec<&ExceptionRule> = constraint.exceptions.iter().collect();
    // Stable sort: equal priorities keep declaration order.
    candidates.sort_by_key(|e| std::cmp::Reverse(e.priority));

    let matched = candidates.into_iter().find(|exception| {
        exception
            .path
            .iter()
            .all(|rc| path.selects(rc.step_index, &rc.option_id))
            && evaluate_conditions(&exception.conditions, ctx)
    });

    if let Some(exception) = matched {
        debug!(
            event = "exception_matched",
            constraint_id = %constraint.id,
            exception_id = %exception.id,
            action = ?exception.action,
        );
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrule_core::{
        ConditionField, ConditionOperator, ConstraintAction, ExternalCondition, Selection,
    };

    fn constraint_with(exceptions: Vec<ExceptionRule>) -> Constraint {
        let mut c = Constraint::next_step("c1", 0, "a1", 2, ["c1-opt"]);
        c.exceptions = exceptions;
        c
    }

    #[test]
    fn test_highest_priority_matching_exception_wins() {
        let constraint = constraint_with(vec![
            ExceptionRule::new("low", ConstraintAction::Enable)
                .with_priority(1)
                .with_path(1, "b1"),
            ExceptionRule::new("high", ConstraintAction::Require)
                .with_priority(5)
                .with_path(1, "b1"),
        ]);
        let path = Selection::new().with(1, "b1");
        let winner = resolve_exception(&constraint, &path, &ExternalContext::default()).unwrap();
        assert_eq!(winner.id, "high");
    }

    #[test]
    fn test_non_matching_paths_fall_through() {
        let constraint = constraint_with(vec![
            ExceptionRule::new("wrong-path", ConstraintAction::Enable)
                .with_priority(9)
                .with_path(1, "b2"),
            ExceptionRule::new("fallback", ConstraintAction::Require).with_priority(1),
        ]);
        let path = Selection::new().with(1, "b1");
        let winner = resolve_exception(&constraint, &path, &ExternalContext::default()).unwrap();
        assert_eq!(winner.id, "fallback");
    }

    #[test]
    fn test_external_conditions_gate_exceptions() {
        let constraint = constraint_with(vec![ExceptionRule::new("seasonal", ConstraintAction::Enable)
            .with_condition(ExternalCondition::new(
                ConditionField::Inventory,
                ConditionOperator::GreaterThan,
                100,
            ))]);
        let path = Selection::new();

        let low = ExternalContext::default().with_inventory(5);
        assert!(resolve_exception(&constraint, &path, &low).is_none());

        let high = ExternalContext::default().with_inventory(500);
        assert!(resolve_exception(&constraint, &path, &high).is_some());
    }

    #[test]
    fn test_no_exceptions_means_no_override() {
        let constraint = constraint_with(Vec::new());
        assert!(resolve_exception(&constraint, &Selection::new(), &ExternalContext::default())
            .is_none());
    }
}
