//! Workflow steps and their selectable options.
//!
//! A workflow is an ordered sequence of [`Step`]s; the position of a step in
//! that sequence (its index) is semantically significant because constraints
//! reference steps by index, not by id.

use serde::{Deserialize, Serialize};

use crate::error::PathruleError;

/// A selectable option within a step.
///
/// Identity is the `id`; `name` is the internal name (unique within its
/// step) and `display_name` the user-facing label, which may be blank.
///
/// # Example
///
/// ```
/// use pathrule_core::StepOption;
///
/// let opt = StepOption::new("opt-1", "express");
/// assert_eq!(opt.id, "opt-1");
/// assert!(opt.is_active);
/// assert!(opt.display_name.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    /// Stable identifier, unique within the owning step.
    pub id: String,
    /// Internal name, unique within the owning step.
    pub name: String,
    /// User-facing label; may be blank.
    #[serde(default)]
    pub display_name: String,
    /// Soft on/off switch maintained by the caller.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl StepOption {
    /// Creates an active option with a blank display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            is_active: true,
        }
    }

    /// Sets the user-facing display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// One step of a decision workflow, owning an ordered list of options.
///
/// # Example
///
/// ```
/// use pathrule_core::{Step, StepOption};
///
/// let step = Step::new("s-ship", "shipping")
///     .with_option(StepOption::new("o-std", "standard"))
///     .with_option(StepOption::new("o-exp", "express"));
/// assert_eq!(step.options.len(), 2);
/// assert_eq!(step.option_index("o-exp"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier of the step.
    pub id: String,
    /// Internal name of the step.
    pub name: String,
    /// User-facing label; may be blank.
    #[serde(default)]
    pub display_name: String,
    /// Ordered options; order is part of the workflow definition.
    #[serde(default)]
    pub options: Vec<StepOption>,
    /// Soft on/off switch maintained by the caller.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Step {
    /// Creates an active step with no options.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            options: Vec::new(),
            is_active: true,
        }
    }

    /// Appends an option, preserving insertion order.
    pub fn with_option(mut self, option: StepOption) -> Self {
        self.options.push(option);
        self
    }

    /// Appends an option after checking the id is not already taken.
    ///
    /// Option ids must be unique within their step; callers that assemble
    /// steps from untrusted edits use this instead of [`Step::with_option`].
    pub fn try_push_option(&mut self, option: StepOption) -> Result<(), PathruleError> {
        if self.options.iter().any(|o| o.id == option.id) {
            return Err(PathruleError::DuplicateOptionId {
                step: self.id.clone(),
                option: option.id,
            });
        }
        self.options.push(option);
        Ok(())
    }

    /// Looks up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&StepOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Returns the position of an option within this step.
    pub fn option_index(&self, option_id: &str) -> Option<usize> {
        self.options.iter().position(|o| o.id == option_id)
    }

    /// Returns whether an option with the given id exists.
    pub fn has_option(&self, option_id: &str) -> bool {
        self.option(option_id).is_some()
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_lookup() {
        let step = Step::new("s1", "color")
            .with_option(StepOption::new("o1", "red"))
            .with_option(StepOption::new("o2", "blue"));
        assert_eq!(step.option("o2").map(|o| o.name.as_str()), Some("blue"));
        assert_eq!(step.option_index("o1"), Some(0));
        assert!(!step.has_option("o3"));
    }

    #[test]
    fn test_duplicate_option_id_rejected() {
        let mut step = Step::new("s1", "color").with_option(StepOption::new("o1", "red"));
        let err = step
            .try_push_option(StepOption::new("o1", "crimson"))
            .unwrap_err();
        assert!(matches!(err, PathruleError::DuplicateOptionId { .. }));
        assert_eq!(step.options.len(), 1);
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let step: Step = serde_json::from_str(r#"{"id":"s1","name":"color"}"#).unwrap();
        assert!(step.is_active);
        assert!(step.options.is_empty());
        assert!(step.display_name.is_empty());
    }
}
