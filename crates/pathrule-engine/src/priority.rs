//! Live-selection constraint resolution with priority-based conflict
//! handling.
//!
//! This is the second of the two evaluation modes (the first being
//! whole-path precomputation in [`crate::activation`]): given an in-progress
//! selection, resolve every applying constraint into per-step
//! disabled/enabled/required option sets, reporting every conflict that had
//! to be resolved along the way.

use std::collections::{BTreeMap, BTreeSet};

use pathrule_core::{
    ConflictLevel, ConflictResolution, Constraint, ConstraintAction, ConstraintConflict,
    ConstraintKind, ConstraintMap, ConstraintScope, EffectTarget, ExternalContext, PathView,
    Selection, Step,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::condition::evaluate_conditions;
use crate::exception::resolve_exception;
use crate::scope::evaluate_scope;
use crate::target::resolve_targets;

/// Scope bases for calculated default priorities.
const GLOBAL_BASE: i64 = 10;
const ROUTE_BASED_BASE: i64 = 50;
const CONDITIONAL_ROUTE_BASE: i64 = 100;

/// Record of an exception overriding a constraint during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedException {
    pub constraint_id: String,
    pub exception_id: String,
}

/// Everything the live-selection resolver derives for one selection.
///
/// All fields are recomputable data; nothing here is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResolution {
    /// Options forced off, per step index.
    pub disabled_options: BTreeMap<usize, BTreeSet<String>>,
    /// Options forced on, per step index.
    pub enabled_options: BTreeMap<usize, BTreeSet<String>>,
    /// Options marked mandatory, per step index.
    pub required_options: BTreeMap<usize, BTreeSet<String>>,
    /// Every conflict that was resolved, in target order.
    pub conflicts: Vec<ConstraintConflict>,
    /// Ids of constraints that contributed at least one effect.
    pub applied_constraints: Vec<String>,
    /// Exceptions that overrode their constraint in this resolution.
    pub exceptions_applied: Vec<AppliedException>,
}

/// One constraint's effect on one target, ready for conflict grouping.
#[derive(Debug, Clone)]
struct Evaluation {
    constraint_id: String,
    priority: i64,
    action: ConstraintAction,
}

/// Resolves an in-progress selection against a constraint set.
///
/// Per constraint: skip unless it is active, its source option is selected,
/// its scope applies, and (for the conditional kind) its external conditions
/// hold. Applying constraints are expanded into concrete effect targets with
/// exception overrides resolved, then grouped per target; within each group
/// the highest effective priority wins and equal-top-priority ties break by
/// action precedence (enable > require > disable). A conflict record is
/// emitted for every group whose actions disagreed.
pub fn apply_constraints_with_priority(
    steps: &[Step],
    constraints: &ConstraintMap,
    selection: &Selection,
    ctx: &ExternalContext,
) -> ConstraintResolution {
    let mut resolution = ConstraintResolution::default();
    let mut groups: BTreeMap<EffectTarget, Vec<Evaluation>> = BTreeMap::new();

    for (id, constraint) in constraints {
        if !constraint.is_active {
            continue;
        }
        if !selection.selects(constraint.source_step, &constraint.source_option) {
            continue;
        }
        let scope = evaluate_scope(constraint, selection, ctx);
        if !scope.applies {
            debug!(event = "constraint_skipped", constraint_id = %id, reason = ?scope.reason);
            continue;
        }
        if matches!(constraint.kind, ConstraintKind::Conditional { .. })
            && !evaluate_conditions(&constraint.external_conditions, ctx)
        {
            debug!(event = "constraint_skipped", constraint_id = %id, reason = "conditions-failed");
            continue;
        }

        let mut action = constraint.action;
        let mut targets = resolve_targets(constraint, selection, steps);
        let exception = resolve_exception(constraint, selection, ctx);
        if let Some(exception) = exception {
            action = exception.action;
            if !exception.targets.is_empty() {
                targets = existing_targets(&exception.targets, steps);
            }
        }
        if targets.is_empty() {
            continue;
        }

        resolution.applied_constraints.push(id.clone());
        if let Some(exception) = exception {
            resolution.exceptions_applied.push(AppliedException {
                constraint_id: id.clone(),
                exception_id: exception.id.clone(),
            });
        }

        let priority = effective_priority(constraint);
        for target in targets {
            trace!(
                event = "effect_resolved",
                constraint_id = %id,
                step = target.step_index,
                option = %target.option_id,
                action = ?action,
                priority,
            );
            groups.entry(target).or_default().push(Evaluation {
                constraint_id: id.clone(),
                priority,
                action,
            });
        }
    }

    for (target, mut evaluations) in groups {
        // Stable: equal priorities keep constraint-id order.
        evaluations.sort_by_key(|e| std::cmp::Reverse(e.priority));
        let (winner, resolution_kind) = pick_winner(&evaluations);
        let winning_action = evaluations[winner].action;

        let contested = evaluations.iter().any(|e| e.action != winning_action);
        if contested {
            resolution.conflicts.push(ConstraintConflict {
                target: target.clone(),
                winner: evaluations[winner].constraint_id.clone(),
                losers: evaluations
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != winner)
                    .map(|(_, e)| e.constraint_id.clone())
                    .collect(),
                winning_action,
                resolution: resolution_kind,
                level: ConflictLevel::Warning,
            });
        }

        apply_action(&mut resolution, &target, winning_action);
    }

    info!(
        event = "constraints_resolved",
        applied = resolution.applied_constraints.len(),
        conflicts = resolution.conflicts.len(),
        exceptions = resolution.exceptions_applied.len(),
    );
    resolution
}

/// Index of the winning evaluation plus how it won.
///
/// Expects `evaluations` sorted descending by priority and non-empty.
fn pick_winner(evaluations: &[Evaluation]) -> (usize, ConflictResolution) {
    let top_priority = evaluations[0].priority;
    let top: Vec<usize> = evaluations
        .iter()
        .enumerate()
        .take_while(|(_, e)| e.priority == top_priority)
        .map(|(i, _)| i)
        .collect();

    if top.len() == 1 {
        return (top[0], ConflictResolution::Priority);
    }

    let tie_contested = top
        .iter()
        .any(|&i| evaluations[i].action != evaluations[top[0]].action);
    let winner = top
        .iter()
        .copied()
        .max_by_key(|&i| evaluations[i].action.precedence())
        .unwrap_or(top[0]);
    if tie_contested {
        (winner, ConflictResolution::ActionPrecedence)
    } else {
        // Same-priority same-action duplicates carry no contradiction.
        (top[0], ConflictResolution::Priority)
    }
}

/// Mutates the three per-step sets with the clearing rules: enable clears
/// disable; disable clears enable and require; require clears disable.
fn apply_action(
    resolution: &mut ConstraintResolution,
    target: &EffectTarget,
    action: ConstraintAction,
) {
    let step = target.step_index;
    let option = &target.option_id;
    match action {
        ConstraintAction::Disable => {
            resolution
                .disabled_options
                .entry(step)
                .or_default()
                .insert(option.clone());
            remove_from(&mut resolution.enabled_options, step, option);
            remove_from(&mut resolution.required_options, step, option);
        }
        ConstraintAction::Enable => {
            resolution
                .enabled_options
                .entry(step)
                .or_default()
                .insert(option.clone());
            remove_from(&mut resolution.disabled_options, step, option);
        }
        ConstraintAction::Require => {
            resolution
                .required_options
                .entry(step)
                .or_default()
                .insert(option.clone());
            remove_from(&mut resolution.disabled_options, step, option);
        }
    }
}

fn remove_from(sets: &mut BTreeMap<usize, BTreeSet<String>>, step: usize, option: &str) {
    if let Some(set) = sets.get_mut(&step) {
        set.remove(option);
        if set.is_empty() {
            sets.remove(&step);
        }
    }
}

fn existing_targets(targets: &[EffectTarget], steps: &[Step]) -> Vec<EffectTarget> {
    targets
        .iter()
        .filter(|t| {
            steps
                .get(t.step_index)
                .is_some_and(|s| s.has_option(&t.option_id))
        })
        .cloned()
        .collect()
}

/// Calculated default priority, used when a constraint has no explicit one.
///
/// Scope sets the base (global 10, route-based 50, conditional-route 100);
/// the kind and action add small increments so that no two defaults within
/// one scope are accidentally equal across differently-shaped constraints.
pub fn calculate_default_priority(constraint: &Constraint) -> i64 {
    let scope_base = match constraint.scope {
        ConstraintScope::Global => GLOBAL_BASE,
        ConstraintScope::RouteBased => ROUTE_BASED_BASE,
        ConstraintScope::ConditionalRoute => CONDITIONAL_ROUTE_BASE,
    };
    let kind_increment = match constraint.kind {
        ConstraintKind::PreviousStep { .. } => 1,
        ConstraintKind::NextStep { .. } => 2,
        ConstraintKind::RangeSkip { .. } => 3,
        ConstraintKind::Conditional { .. } => 4,
    };
    let action_increment = i64::from(constraint.action.precedence());
    scope_base + kind_increment + action_increment
}

/// Explicit priority when set, calculated default otherwise.
pub fn effective_priority(constraint: &Constraint) -> i64 {
    constraint
        .priority
        .unwrap_or_else(|| calculate_default_priority(constraint))
}

/// Renumbers explicit priorities to consecutive integers starting at 1,
/// ascending by current effective priority (ties by constraint id).
pub fn normalize_priorities(constraints: &ConstraintMap) -> ConstraintMap {
    let mut order: Vec<(&String, i64)> = constraints
        .iter()
        .map(|(id, c)| (id, effective_priority(c)))
        .collect();
    order.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let ranks: BTreeMap<&String, i64> = order
        .into_iter()
        .enumerate()
        .map(|(rank, (id, _))| (id, rank as i64 + 1))
        .collect();

    constraints
        .iter()
        .map(|(id, c)| {
            let mut c = c.clone();
            c.priority = Some(ranks[id]);
            (id.clone(), c)
        })
        .collect()
}

/// Replaces every explicit priority with the calculated default.
pub fn recalculate_priorities(constraints: &ConstraintMap) -> ConstraintMap {
    constraints
        .iter()
        .map(|(id, c)| {
            let mut c = c.clone();
            c.priority = Some(calculate_default_priority(&c));
            (id.clone(), c)
        })
        .collect()
}
