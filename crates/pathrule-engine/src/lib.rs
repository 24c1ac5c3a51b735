//! Constraint evaluation engine for pathrule decision workflows.
//!
//! Every exported function is a pure transform over its inputs: steps,
//! constraints, a path or selection, and an external context. There is no
//! shared mutable state, no I/O and no blocking; recomputation is idempotent
//! and safe on every edit. The one scaling concern is the combinatorial size
//! of the path enumeration, which callers bound themselves (see
//! [`combination::combination_count`]).
//!
//! Two evaluation modes share the same scope and target logic:
//! - **Whole-path precomputation** ([`activation`]) walks every enumerated
//!   combination and derives a per-step activation vector.
//! - **Live selection** ([`priority`]) resolves an in-progress selection into
//!   disabled/enabled/required option sets with full conflict reporting.
//!
//! Logging levels:
//! - **INFO**: entry-point summaries (counts of constraints, paths, conflicts)
//! - **DEBUG**: per-constraint application and skip decisions
//! - **TRACE**: per-combination evaluation detail

pub mod activation;
pub mod combination;
pub mod condition;
pub mod conflict;
pub mod exception;
pub mod integrity;
pub mod priority;
pub mod scope;
pub mod target;
pub mod validate;

#[cfg(test)]
mod activation_tests;

pub use activation::{generate_path_activations, generate_path_activations_with_baseline};
pub use combination::{combination_count, generate_combinations};
pub use condition::{evaluate_condition, evaluate_conditions};
pub use conflict::{
    detect_circular_references, detect_constraint_conflicts, detect_same_priority_conflicts,
};
pub use exception::resolve_exception;
pub use integrity::{
    adjust_constraints_for_step_deletion, adjust_constraints_for_step_insertion,
};
pub use priority::{
    apply_constraints_with_priority, calculate_default_priority, effective_priority,
    normalize_priorities, recalculate_priorities, AppliedException, ConstraintResolution,
};
pub use scope::{evaluate_scope, ScopeDecision, ScopeReason};
pub use target::{resolve_targets, static_targets};
pub use validate::{
    clean_invalid_constraints, validate_constraints, InvalidConstraint, ValidationIssue,
    ValidationReport,
};
