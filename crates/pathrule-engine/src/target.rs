//! Target resolution: which `(step, option)` pairs a constraint affects.

use pathrule_core::{Constraint, ConstraintKind, EffectTarget, PathView, Step};

/// Expands an applying constraint into its concrete effect targets.
///
/// Malformed data (out-of-range indices, options that no longer exist, a
/// range-skip without target steps) resolves to an empty target set. The
/// constraint then simply does not apply; mid-edit data must never panic.
///
/// The `previous-step` kind is asymmetric by design: when any of its target
/// options is present in the path at the target step, the effect lands on
/// the **source** option ("this choice is invalid if that other choice was
/// made"). All other kinds act on their declared targets.
pub fn resolve_targets<P: PathView>(
    constraint: &Constraint,
    path: &P,
    steps: &[Step],
) -> Vec<EffectTarget> {
    if !source_exists(constraint, steps) {
        return Vec::new();
    }

    match &constraint.kind {
        ConstraintKind::PreviousStep {
            target_step,
            target_options,
        } => {
            let target_chosen = target_options
                .iter()
                .any(|opt| path.selects(*target_step, opt));
            if target_chosen {
                vec![EffectTarget::new(
                    constraint.source_step,
                    constraint.source_option.clone(),
                )]
            } else {
                Vec::new()
            }
        }
        ConstraintKind::NextStep {
            target_step,
            target_options,
        }
        | ConstraintKind::Conditional {
            target_step,
            target_options,
        } => existing_options(steps, *target_step, target_options),
        ConstraintKind::RangeSkip { target_steps } => target_steps
            .iter()
            .flat_map(|skip| {
                if skip.option_ids.is_empty() {
                    whole_step(steps, skip.step_index)
                } else {
                    existing_options(steps, skip.step_index, &skip.option_ids)
                }
            })
            .collect(),
    }
}

/// The selection-independent set of targets a constraint *could* affect.
///
/// Used by structural analyses that have no concrete path to resolve
/// against: `previous-step` contributes its source (where its effect lands),
/// every other kind its declared target expansion.
pub fn static_targets(constraint: &Constraint, steps: &[Step]) -> Vec<EffectTarget> {
    if !source_exists(constraint, steps) {
        return Vec::new();
    }

    match &constraint.kind {
        ConstraintKind::PreviousStep { .. } => vec![EffectTarget::new(
            constraint.source_step,
            constraint.source_option.clone(),
        )],
        ConstraintKind::NextStep {
            target_step,
            target_options,
        }
        | ConstraintKind::Conditional {
            target_step,
            target_options,
        } => existing_options(steps, *target_step, target_options),
        ConstraintKind::RangeSkip { target_steps } => target_steps
            .iter()
            .flat_map(|skip| {
                if skip.option_ids.is_empty() {
                    whole_step(steps, skip.step_index)
                } else {
                    existing_options(steps, skip.step_index, &skip.option_ids)
                }
            })
            .collect(),
    }
}

fn source_exists(constraint: &Constraint, steps: &[Step]) -> bool {
    steps
        .get(constraint.source_step)
        .is_some_and(|s| s.has_option(&constraint.source_option))
}

/// The listed options that still exist at the step; ghosts are dropped.
fn existing_options(steps: &[Step], step_index: usize, option_ids: &[String]) -> Vec<EffectTarget> {
    let Some(step) = steps.get(step_index) else {
        return Vec::new();
    };
    option_ids
        .iter()
        .filter(|id| step.has_option(id))
        .map(|id| EffectTarget::new(step_index, id.clone()))
        .collect()
}

fn whole_step(steps: &[Step], step_index: usize) -> Vec<EffectTarget> {
    let Some(step) = steps.get(step_index) else {
        return Vec::new();
    };
    step.options
        .iter()
        .map(|o| EffectTarget::new(step_index, o.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrule_core::{Selection, SkipTarget};
    use pathrule_test::three_step_sheet as steps;

    #[test]
    fn test_previous_step_targets_the_source() {
        let constraint = Constraint::previous_step("c1", 0, "a1", 1, ["b1"]);
        let steps = steps();

        let with_target = Selection::new().with(0, "a1").with(1, "b1");
        let targets = resolve_targets(&constraint, &with_target, &steps);
        assert_eq!(targets, vec![EffectTarget::new(0, "a1")]);

        let without_target = Selection::new().with(0, "a1").with(1, "b2");
        assert!(resolve_targets(&constraint, &without_target, &steps).is_empty());
    }

    #[test]
    fn test_next_step_targets_listed_options() {
        let constraint = Constraint::next_step("c1", 0, "a1", 2, ["c1", "c2"]);
        let targets = resolve_targets(&constraint, &Selection::new().with(0, "a1"), &steps());
        assert_eq!(
            targets,
            vec![EffectTarget::new(2, "c1"), EffectTarget::new(2, "c2")]
        );
    }

    #[test]
    fn test_range_skip_expands_whole_steps() {
        let constraint = Constraint::range_skip(
            "c1",
            0,
            "a1",
            [SkipTarget::whole_step(1), SkipTarget::options(2, ["c2"])],
        );
        let targets = resolve_targets(&constraint, &Selection::new().with(0, "a1"), &steps());
        assert_eq!(
            targets,
            vec![
                EffectTarget::new(1, "b1"),
                EffectTarget::new(1, "b2"),
                EffectTarget::new(2, "c2"),
            ]
        );
    }

    #[test]
    fn test_malformed_data_resolves_to_nothing() {
        let steps = steps();
        let selection = Selection::new().with(0, "a1");

        // Range-skip without targets: transient mid-edit shape.
        let empty = Constraint::range_skip("c1", 0, "a1", []);
        assert!(resolve_targets(&empty, &selection, &steps).is_empty());

        // Out-of-range target step.
        let dangling = Constraint::next_step("c2", 0, "a1", 9, ["x"]);
        assert!(resolve_targets(&dangling, &selection, &steps).is_empty());

        // Deleted source option.
        let ghost_source = Constraint::next_step("c3", 0, "gone", 2, ["c1"]);
        assert!(resolve_targets(&ghost_source, &selection, &steps).is_empty());

        // Ghost target options are dropped, existing ones kept.
        let partial = Constraint::next_step("c4", 0, "a1", 2, ["c1", "deleted"]);
        let targets = resolve_targets(&partial, &selection, &steps);
        assert_eq!(targets, vec![EffectTarget::new(2, "c1")]);
    }
}
