//! Selection-independent constraint analysis: structural conflicts and
//! circular references.
//!
//! The live resolver reports conflicts for one concrete selection; the
//! detectors here look at the constraint set as a whole, predicting which
//! targets constraints *could* converge on regardless of what the user has
//! picked so far.

use std::collections::{BTreeMap, BTreeSet};

use pathrule_core::{
    ConflictLevel, ConflictResolution, Constraint, ConstraintConflict, ConstraintKind,
    ConstraintMap, EffectTarget, Step,
};
use tracing::info;

use crate::priority::effective_priority;
use crate::target::static_targets;

/// Finds pairs of active constraints whose effects can converge on the same
/// `(step, option)` target with differing actions.
///
/// Pairs that can never co-apply are skipped: two constraints demanding
/// different options at the same step, through their sources or their route
/// conditions, cannot both trigger on one path. Each reported conflict
/// records the resolution the live resolver would pick.
pub fn detect_constraint_conflicts(
    constraints: &ConstraintMap,
    steps: &[Step],
) -> Vec<ConstraintConflict> {
    let conflicts = pairwise_conflicts(constraints, steps, |_, _| true);
    info!(event = "structural_conflicts_detected", count = conflicts.len());
    conflicts
}

/// The subset of structural conflicts where both constraints carry the same
/// effective priority, so only action precedence separates them.
pub fn detect_same_priority_conflicts(
    constraints: &ConstraintMap,
    steps: &[Step],
) -> Vec<ConstraintConflict> {
    pairwise_conflicts(constraints, steps, |a, b| a.priority == b.priority)
}

struct Entry<'c> {
    constraint: &'c Constraint,
    priority: i64,
}

fn pairwise_conflicts(
    constraints: &ConstraintMap,
    steps: &[Step],
    extra: impl Fn(&Entry, &Entry) -> bool,
) -> Vec<ConstraintConflict> {
    // Entries per target, in target order; ids stay sorted within each
    // group because ConstraintMap iterates in id order.
    let mut groups: BTreeMap<EffectTarget, Vec<Entry>> = BTreeMap::new();
    for constraint in constraints.values().filter(|c| c.is_active) {
        for target in static_targets(constraint, steps) {
            groups.entry(target).or_default().push(Entry {
                constraint,
                priority: effective_priority(constraint),
            });
        }
    }

    let mut conflicts = Vec::new();
    for (target, entries) in &groups {
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.constraint.action == b.constraint.action {
                    continue;
                }
                if !may_co_apply(a.constraint, b.constraint) || !extra(a, b) {
                    continue;
                }
                conflicts.push(predict_resolution(target, a, b));
            }
        }
    }
    conflicts
}

/// Whether two constraints can trigger on one and the same path.
fn may_co_apply(a: &Constraint, b: &Constraint) -> bool {
    // One step holds one selection: colliding demands are mutually exclusive.
    fn demands(c: &Constraint) -> Vec<(usize, &str)> {
        let mut demands: Vec<(usize, &str)> = vec![(c.source_step, c.source_option.as_str())];
        demands.extend(
            c.route_conditions
                .iter()
                .map(|rc| (rc.step_index, rc.option_id.as_str())),
        );
        demands
    }
    for (step_a, option_a) in demands(a) {
        for (step_b, option_b) in demands(b) {
            if step_a == step_b && option_a != option_b {
                return false;
            }
        }
    }
    true
}

/// The conflict record the live resolver would produce for this pair.
fn predict_resolution(target: &EffectTarget, a: &Entry, b: &Entry) -> ConstraintConflict {
    let (winner, loser, resolution) = if a.priority != b.priority {
        let (w, l) = if a.priority > b.priority { (a, b) } else { (b, a) };
        (w, l, ConflictResolution::Priority)
    } else {
        let (w, l) = if a.constraint.action.precedence() >= b.constraint.action.precedence() {
            (a, b)
        } else {
            (b, a)
        };
        (w, l, ConflictResolution::ActionPrecedence)
    };
    ConstraintConflict {
        target: target.clone(),
        winner: winner.constraint.id.clone(),
        losers: vec![loser.constraint.id.clone()],
        winning_action: winner.constraint.action,
        resolution,
        level: ConflictLevel::Warning,
    }
}

type Node = (usize, String);

/// Finds cycles in the reference graph whose edges run from each active
/// constraint's source `(step, option)` to each of its declared targets.
///
/// Each cycle is returned as the chain of constraint ids along its edges,
/// rotated so the lexicographically smallest id leads; cycles are reported
/// once, in deterministic order. Range-skip whole-step entries declare no
/// concrete option and contribute no edges.
pub fn detect_circular_references(constraints: &ConstraintMap) -> Vec<Vec<String>> {
    let mut adjacency: BTreeMap<Node, Vec<(Node, String)>> = BTreeMap::new();
    for (id, constraint) in constraints {
        if !constraint.is_active {
            continue;
        }
        let from = (
            constraint.source_step,
            constraint.source_option.clone(),
        );
        for to in declared_refs(constraint) {
            adjacency.entry(from.clone()).or_default().push((to, id.clone()));
        }
    }

    let mut finder = CycleFinder {
        adjacency: &adjacency,
        stack: Vec::new(),
        edge_ids: Vec::new(),
        in_stack: BTreeSet::new(),
        done: BTreeSet::new(),
        cycles: BTreeSet::new(),
    };
    let roots: Vec<Node> = adjacency.keys().cloned().collect();
    for root in roots {
        if !finder.done.contains(&root) {
            finder.dfs(root);
        }
    }
    finder.cycles.into_iter().collect()
}

/// The `(step, option)` pairs a constraint refers to as targets, with no
/// steps snapshot required.
fn declared_refs(constraint: &Constraint) -> Vec<Node> {
    match &constraint.kind {
        ConstraintKind::PreviousStep {
            target_step,
            target_options,
        }
        | ConstraintKind::NextStep {
            target_step,
            target_options,
        }
        | ConstraintKind::Conditional {
            target_step,
            target_options,
        } => target_options
            .iter()
            .map(|opt| (*target_step, opt.clone()))
            .collect(),
        ConstraintKind::RangeSkip { target_steps } => target_steps
            .iter()
            .flat_map(|skip| {
                skip.option_ids
                    .iter()
                    .map(|opt| (skip.step_index, opt.clone()))
            })
            .collect(),
    }
}

struct CycleFinder<'g> {
    adjacency: &'g BTreeMap<Node, Vec<(Node, String)>>,
    stack: Vec<Node>,
    /// `edge_ids[i]` is the constraint carrying `stack[i]` to `stack[i+1]`.
    edge_ids: Vec<String>,
    in_stack: BTreeSet<Node>,
    done: BTreeSet<Node>,
    cycles: BTreeSet<Vec<String>>,
}

impl CycleFinder<'_> {
    fn dfs(&mut self, node: Node) {
        self.in_stack.insert(node.clone());
        self.stack.push(node.clone());

        for (next, edge_id) in self.adjacency.get(&node).into_iter().flatten() {
            if self.in_stack.contains(next) {
                let start = self
                    .stack
                    .iter()
                    .position(|n| n == next)
                    .unwrap_or_default();
                let mut chain: Vec<String> = self.edge_ids[start..].to_vec();
                chain.push(edge_id.clone());
                self.cycles.insert(canonical_rotation(chain));
            } else if !self.done.contains(next) {
                self.edge_ids.push(edge_id.clone());
                self.dfs(next.clone());
                self.edge_ids.pop();
            }
        }

        self.stack.pop();
        self.in_stack.remove(&node);
        self.done.insert(node);
    }
}

/// Rotates a cycle chain so the smallest constraint id leads.
fn canonical_rotation(chain: Vec<String>) -> Vec<String> {
    let Some(min_pos) = chain
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
    else {
        return chain;
    };
    let mut rotated = chain[min_pos..].to_vec();
    rotated.extend_from_slice(&chain[..min_pos]);
    rotated
}
