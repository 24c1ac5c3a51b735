//! Conflict records emitted when constraint effects converge.

use serde::{Deserialize, Serialize};

use crate::constraint::{ConstraintAction, EffectTarget};

/// How a conflicting group was (or would be) resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
    /// A single highest numeric priority won outright.
    Priority,
    /// Equal top priorities were broken by action precedence.
    ActionPrecedence,
}

/// Severity of a recorded conflict.
///
/// The live resolver always reports `Warning`: a resolved conflict is a
/// deliberate layering of policies, not an error. `Error` is reserved for
/// structural analyses where no resolution is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictLevel {
    Warning,
    Error,
}

/// Record of several constraints converging on one `(step, option)` target
/// with differing actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintConflict {
    /// Target the effects converged on.
    pub target: EffectTarget,
    /// Id of the winning constraint.
    pub winner: String,
    /// Ids of the overridden constraints, in descending priority order.
    pub losers: Vec<String>,
    /// Action that was applied.
    pub winning_action: ConstraintAction,
    pub resolution: ConflictResolution,
    pub level: ConflictLevel,
}
