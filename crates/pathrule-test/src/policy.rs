//! Constraint set helpers.

use pathrule_core::{Constraint, ConstraintMap};

/// Keys constraints by their own ids.
pub fn constraint_map(constraints: impl IntoIterator<Item = Constraint>) -> ConstraintMap {
    constraints.into_iter().map(|c| (c.id.clone(), c)).collect()
}
