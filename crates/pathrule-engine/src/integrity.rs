//! Structural integrity maintenance across workflow edits.
//!
//! Constraints reference steps by index, so inserting or removing a step
//! shifts every index-valued field at or beyond the edit point. Scalar
//! fields that referenced a deleted step are left in place for the
//! validator to flag; list fields degrade by dropping just the affected
//! entries. Constraints are never auto-deleted here.

use pathrule_core::{Constraint, ConstraintKind, ConstraintMap, ConstraintScope};
use tracing::debug;

/// Returns the constraint set with every step index at or beyond
/// `insert_index` incremented by one.
pub fn adjust_constraints_for_step_insertion(
    constraints: &ConstraintMap,
    insert_index: usize,
) -> ConstraintMap {
    constraints
        .iter()
        .map(|(id, c)| {
            let mut c = c.clone();
            shift_up(&mut c, insert_index);
            (id.clone(), c)
        })
        .collect()
}

/// Returns the constraint set adjusted for the removal of the step at
/// `deleted_index`: indices beyond it decrement, list entries referencing it
/// are dropped, and a route-based constraint whose route conditions emptied
/// out degrades to global scope. Scalar fields equal to the deleted index
/// are left untouched for the validator.
pub fn adjust_constraints_for_step_deletion(
    constraints: &ConstraintMap,
    deleted_index: usize,
) -> ConstraintMap {
    constraints
        .iter()
        .map(|(id, c)| {
            let mut c = c.clone();
            shift_down(&mut c, deleted_index);
            if c.scope == ConstraintScope::RouteBased && c.route_conditions.is_empty() {
                debug!(event = "scope_degraded", constraint_id = %id);
                c.scope = ConstraintScope::Global;
            }
            (id.clone(), c)
        })
        .collect()
}

fn shift_up(constraint: &mut Constraint, insert_index: usize) {
    let bump = |index: &mut usize| {
        if *index >= insert_index {
            *index += 1;
        }
    };

    bump(&mut constraint.source_step);
    match &mut constraint.kind {
        ConstraintKind::PreviousStep { target_step, .. }
        | ConstraintKind::NextStep { target_step, .. }
        | ConstraintKind::Conditional { target_step, .. } => bump(target_step),
        ConstraintKind::RangeSkip { target_steps } => {
            for skip in target_steps {
                bump(&mut skip.step_index);
            }
        }
    }
    for rc in &mut constraint.route_conditions {
        bump(&mut rc.step_index);
    }
    for exception in &mut constraint.exceptions {
        for rc in &mut exception.path {
            bump(&mut rc.step_index);
        }
        for target in &mut exception.targets {
            bump(&mut target.step_index);
        }
    }
}

fn shift_down(constraint: &mut Constraint, deleted_index: usize) {
    // Scalar fields: decrement past the deletion point, leave == alone.
    let drop_scalar = |index: &mut usize| {
        if *index > deleted_index {
            *index -= 1;
        }
    };

    drop_scalar(&mut constraint.source_step);
    match &mut constraint.kind {
        ConstraintKind::PreviousStep { target_step, .. }
        | ConstraintKind::NextStep { target_step, .. }
        | ConstraintKind::Conditional { target_step, .. } => drop_scalar(target_step),
        ConstraintKind::RangeSkip { target_steps } => {
            target_steps.retain(|skip| skip.step_index != deleted_index);
            for skip in target_steps {
                drop_scalar(&mut skip.step_index);
            }
        }
    }

    constraint
        .route_conditions
        .retain(|rc| rc.step_index != deleted_index);
    for rc in &mut constraint.route_conditions {
        drop_scalar(&mut rc.step_index);
    }

    for exception in &mut constraint.exceptions {
        exception.path.retain(|rc| rc.step_index != deleted_index);
        for rc in &mut exception.path {
            drop_scalar(&mut rc.step_index);
        }
        exception
            .targets
            .retain(|target| target.step_index != deleted_index);
        for target in &mut exception.targets {
            drop_scalar(&mut target.step_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrule_core::{ConstraintAction, ExceptionRule, SkipTarget};
    use pathrule_test::constraint_map as map_of;

    #[test]
    fn test_insertion_shifts_indices_at_or_beyond() {
        let constraint = Constraint::next_step("c1", 0, "a1", 2, ["c1-opt"])
            .with_route_condition(1, "b1")
            .with_exception(
                ExceptionRule::new("e1", ConstraintAction::Enable)
                    .with_path(2, "c2-opt")
                    .with_target(1, "b2"),
            );
        let adjusted = adjust_constraints_for_step_insertion(&map_of(vec![constraint]), 1);
        let c = &adjusted["c1"];

        // Below the insertion point: untouched.
        assert_eq!(c.source_step, 0);
        // At or beyond: shifted by exactly one.
        match &c.kind {
            ConstraintKind::NextStep { target_step, .. } => assert_eq!(*target_step, 3),
            _ => unreachable!(),
        }
        assert_eq!(c.route_conditions[0].step_index, 2);
        assert_eq!(c.exceptions[0].path[0].step_index, 3);
        assert_eq!(c.exceptions[0].targets[0].step_index, 2);
    }

    #[test]
    fn test_deletion_decrements_and_degrades_lists() {
        let constraint = Constraint::range_skip(
            "c1",
            0,
            "a1",
            [SkipTarget::whole_step(1), SkipTarget::whole_step(3)],
        )
        .with_route_condition(1, "b1")
        .with_route_condition(2, "c1-opt");
        let adjusted = adjust_constraints_for_step_deletion(&map_of(vec![constraint]), 1);
        let c = &adjusted["c1"];

        // The skip entry for the deleted step is gone; the later one shifted.
        match &c.kind {
            ConstraintKind::RangeSkip { target_steps } => {
                assert_eq!(target_steps.len(), 1);
                assert_eq!(target_steps[0].step_index, 2);
            }
            _ => unreachable!(),
        }
        // The route condition on the deleted step is dropped, the other
        // shifted down.
        assert_eq!(c.route_conditions.len(), 1);
        assert_eq!(c.route_conditions[0].step_index, 1);
    }

    #[test]
    fn test_deletion_leaves_scalar_references_for_validator() {
        let constraint = Constraint::next_step("c1", 2, "c1-opt", 1, ["b1"]);
        let adjusted = adjust_constraints_for_step_deletion(&map_of(vec![constraint]), 1);
        let c = &adjusted["c1"];

        // Source beyond the deletion shifted; the dangling target stays put
        // and is the validator's concern.
        assert_eq!(c.source_step, 1);
        match &c.kind {
            ConstraintKind::NextStep { target_step, .. } => assert_eq!(*target_step, 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_emptied_route_conditions_degrade_scope_to_global() {
        let constraint =
            Constraint::next_step("c1", 0, "a1", 2, ["c1-opt"]).with_route_condition(1, "b1");
        assert_eq!(constraint.scope, ConstraintScope::RouteBased);

        let adjusted = adjust_constraints_for_step_deletion(&map_of(vec![constraint]), 1);
        let c = &adjusted["c1"];
        assert!(c.route_conditions.is_empty());
        assert_eq!(c.scope, ConstraintScope::Global);
    }
}
