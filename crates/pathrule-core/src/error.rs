//! Error types for pathrule.
//!
//! Constraint evaluation itself never errors: invalid constraints, conflicts
//! and missing references are all returned as data. Errors only arise at the
//! edges, where callers assemble workflow data.

use thiserror::Error;

/// Main error type for pathrule operations
#[derive(Debug, Error)]
pub enum PathruleError {
    /// An option id was reused within one step
    #[error("duplicate option id '{option}' in step '{step}'")]
    DuplicateOptionId { step: String, option: String },
}
