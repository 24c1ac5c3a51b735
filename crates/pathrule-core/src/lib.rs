//! Pathrule Core - Data model for the workflow constraint engine
//!
//! This crate provides the shared types consumed and produced by the engine:
//! - Steps and options forming a decision workflow
//! - Constraints ("policies") layered on top of a workflow
//! - Paths through a workflow (full combinations and partial selections)
//! - External business context for conditional constraints
//! - Conflict records emitted by constraint resolution
//!
//! Every type is serde-serializable: the engine's contract with its callers
//! is plain JSON-shaped data, never handles or callbacks.

pub mod conflict;
pub mod constraint;
pub mod context;
pub mod error;
pub mod path;
pub mod step;


pub use conflict::{ConflictLevel, ConflictResolution, ConstraintConflict};
pub use constraint::{
    Constraint, ConstraintAction, ConstraintKind, ConstraintMap, ConstraintScope, EffectTarget,
    ExceptionRule, RouteCondition, SkipTarget,
};
pub use context::ExternalContext;
pub use error::PathruleError;
pub use path::{Combination, PathActivationMap, PathView, Selection};
pub use step::{Step, StepOption};

/// External condition types re-exported at crate root for convenience.
pub use constraint::{ConditionField, ConditionOperator, ExternalCondition};
