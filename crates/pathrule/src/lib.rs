//! Pathrule - constraint evaluation for multi-step decision workflows.
//!
//! Define a workflow as ordered steps with selectable options, layer
//! declarative constraints on top, and derive which options are forced
//! on, off, or required, per full path or per in-progress selection.
//!
//! # Example
//!
//! ```
//! use pathrule::{
//!     apply_constraints_with_priority, generate_path_activations, Constraint, ExternalContext,
//!     Selection, Step, StepOption,
//! };
//!
//! let steps = vec![
//!     Step::new("s-size", "size")
//!         .with_option(StepOption::new("small", "small"))
//!         .with_option(StepOption::new("large", "large")),
//!     Step::new("s-ship", "shipping")
//!         .with_option(StepOption::new("post", "post"))
//!         .with_option(StepOption::new("courier", "courier")),
//! ];
//!
//! // Large parcels cannot go by post.
//! let constraint = Constraint::next_step("no-post", 0, "large", 1, ["post"]);
//! let constraints = [(constraint.id.clone(), constraint)].into_iter().collect();
//! let ctx = ExternalContext::default();
//!
//! // Whole-path precomputation: the (large, post) path loses its shipping step.
//! let activations = generate_path_activations(&steps, &constraints, &ctx);
//! assert_eq!(activations["2"], vec![true, false]);
//!
//! // Live selection: picking "large" disables the "post" option.
//! let selection = Selection::new().with(0, "large");
//! let resolution = apply_constraints_with_priority(&steps, &constraints, &selection, &ctx);
//! assert!(resolution.disabled_options[&1].contains("post"));
//! ```

pub use pathrule_core::*;

pub use pathrule_engine::{
    adjust_constraints_for_step_deletion, adjust_constraints_for_step_insertion,
    apply_constraints_with_priority, calculate_default_priority, clean_invalid_constraints,
    combination_count, detect_circular_references, detect_constraint_conflicts,
    detect_same_priority_conflicts, effective_priority, evaluate_condition, evaluate_conditions,
    evaluate_scope, generate_combinations, generate_path_activations,
    generate_path_activations_with_baseline, normalize_priorities, recalculate_priorities,
    resolve_exception, resolve_targets, static_targets, validate_constraints, AppliedException,
    ConstraintResolution, InvalidConstraint, ScopeDecision, ScopeReason, ValidationIssue,
    ValidationReport,
};

pub use pathrule_config::{ConfigError, ContextConfig, EngineConfig, LimitsConfig};
