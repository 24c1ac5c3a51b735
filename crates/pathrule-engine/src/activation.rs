//! Whole-path activation precomputation.
//!
//! For every enumerated combination, derive a per-step boolean vector:
//! baseline `true`, selectively forced `false` by applicable constraints.
//! In this mode constraints can only turn a step *off* relative to the
//! baseline; enable/require semantics only matter in the live-selection
//! mode of [`crate::priority`]. Both modes share scope and target logic.

use pathrule_core::{
    Combination, ConstraintAction, ConstraintKind, ConstraintMap, ExternalContext,
    PathActivationMap, PathView, Step,
};
use tracing::{info, trace};

use crate::combination::generate_combinations;
use crate::condition::evaluate_conditions;
use crate::exception::resolve_exception;
use crate::scope::evaluate_scope;
use crate::target::resolve_targets;

/// Derives the activation vector of every path through the workflow.
///
/// The map key is the stringified combination index (the stable path key of
/// [`generate_combinations`]); the value holds one boolean per step. Pure:
/// identical inputs yield byte-identical output.
pub fn generate_path_activations(
    steps: &[Step],
    constraints: &ConstraintMap,
    ctx: &ExternalContext,
) -> PathActivationMap {
    generate_with(steps, constraints, ctx, None)
}

/// Same as [`generate_path_activations`], merged with a caller-supplied
/// baseline (for example manually-toggled path state) by AND: a step is
/// active only if neither the constraints nor the baseline turned it off.
pub fn generate_path_activations_with_baseline(
    steps: &[Step],
    constraints: &ConstraintMap,
    ctx: &ExternalContext,
    baseline: &PathActivationMap,
) -> PathActivationMap {
    generate_with(steps, constraints, ctx, Some(baseline))
}

fn generate_with(
    steps: &[Step],
    constraints: &ConstraintMap,
    ctx: &ExternalContext,
    baseline: Option<&PathActivationMap>,
) -> PathActivationMap {
    let combinations = generate_combinations(steps);
    let mut activations = PathActivationMap::new();

    for (index, combination) in combinations.iter().enumerate() {
        let path_key = index.to_string();
        let mut vector = constraint_vector(combination, steps, constraints, ctx);

        if let Some(manual) = baseline.and_then(|b| b.get(&path_key)) {
            for (step_index, active) in vector.iter_mut().enumerate() {
                *active &= manual.get(step_index).copied().unwrap_or(true);
            }
        }

        activations.insert(path_key, vector);
    }

    info!(
        event = "path_activations_generated",
        paths = activations.len(),
        constraint_count = constraints.len(),
    );
    activations
}

/// The constraint-derived vector for one combination: all `true`, then each
/// applicable disabling constraint forces the step indices of its matched
/// targets to `false`.
fn constraint_vector(
    combination: &Combination,
    steps: &[Step],
    constraints: &ConstraintMap,
    ctx: &ExternalContext,
) -> Vec<bool> {
    let mut active = vec![true; steps.len()];

    for (id, constraint) in constraints {
        if !constraint.is_active {
            continue;
        }
        if !combination.selects(constraint.source_step, &constraint.source_option) {
            continue;
        }
        if !evaluate_scope(constraint, combination, ctx).applies {
            continue;
        }
        if matches!(constraint.kind, ConstraintKind::Conditional { .. })
            && !evaluate_conditions(&constraint.external_conditions, ctx)
        {
            continue;
        }

        let mut action = constraint.action;
        let mut targets = resolve_targets(constraint, combination, steps);
        if let Some(exception) = resolve_exception(constraint, combination, ctx) {
            action = exception.action;
            if !exception.targets.is_empty() {
                targets = exception.targets.clone();
            }
        }
        if action != ConstraintAction::Disable {
            continue;
        }

        // Only targets whose option is the one chosen in this combination
        // affect this path.
        for target in targets {
            if combination.selects(target.step_index, &target.option_id) {
                trace!(
                    event = "path_step_disabled",
                    constraint_id = %id,
                    step = target.step_index,
                );
                if let Some(entry) = active.get_mut(target.step_index) {
                    *entry = false;
                }
            }
        }
    }

    active
}
