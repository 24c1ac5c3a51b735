//! Workflow constraints ("policies") and their building blocks.
//!
//! A [`Constraint`] is triggered by one source option and, depending on its
//! [`ConstraintKind`], forces other options (or itself) on, off, or required.
//! The kind is a tagged union so that shape errors like a range-skip without
//! target steps are confined to transient mid-edit data instead of being a
//! permanent representable state of every constraint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Constraints keyed by generated id; the unit of storage per workflow sheet.
///
/// A `BTreeMap` keeps iteration order deterministic, which in turn keeps
/// every derived output of the engine byte-stable across runs.
pub type ConstraintMap = BTreeMap<String, Constraint>;

/// Determines which extra predicates must hold for a constraint to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintScope {
    /// Applies whenever the source option is selected.
    Global,
    /// Additionally requires every route condition to match the path.
    RouteBased,
    /// Route conditions plus external business conditions.
    ConditionalRoute,
}

/// The effect a constraint has on its resolved targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintAction {
    /// Force the target off.
    Disable,
    /// Force the target on.
    Enable,
    /// Mark the target as mandatory.
    Require,
}

impl ConstraintAction {
    /// Tie-break precedence when equal-priority constraints collide:
    /// enable > require > disable.
    pub fn precedence(self) -> u8 {
        match self {
            ConstraintAction::Enable => 3,
            ConstraintAction::Require => 2,
            ConstraintAction::Disable => 1,
        }
    }
}

impl Default for ConstraintAction {
    fn default() -> Self {
        ConstraintAction::Disable
    }
}

/// Context field an external condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionField {
    /// Numeric stock level.
    Inventory,
    /// Numeric user tier.
    UserLevel,
    /// Calendar date as a string (compared lexically/lowercased).
    Date,
    /// Time of day as a string.
    Time,
    /// Free-form flag looked up in the custom map by the condition's value.
    Custom,
}

/// Comparison operator of an external condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not-contains")]
    NotContains,
}

/// A predicate over the external business context.
///
/// # Example
///
/// ```
/// use pathrule_core::{ConditionField, ConditionOperator, ExternalCondition};
///
/// let cond = ExternalCondition::new(
///     ConditionField::Inventory,
///     ConditionOperator::GreaterOrEqual,
///     10,
/// );
/// assert_eq!(cond.field, ConditionField::Inventory);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCondition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    /// Comparison value; coerced to number or lowercased string by the
    /// evaluator depending on the operator.
    pub value: Value,
}

impl ExternalCondition {
    pub fn new(field: ConditionField, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }
}

/// A single path predicate: "the option at this step must be this one".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCondition {
    pub step_index: usize,
    pub option_id: String,
}

impl RouteCondition {
    pub fn new(step_index: usize, option_id: impl Into<String>) -> Self {
        Self {
            step_index,
            option_id: option_id.into(),
        }
    }
}

/// One step affected by a range-skip constraint.
///
/// An empty `option_ids` list means every option of the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTarget {
    pub step_index: usize,
    #[serde(default)]
    pub option_ids: Vec<String>,
}

impl SkipTarget {
    /// Targets every option of the step.
    pub fn whole_step(step_index: usize) -> Self {
        Self {
            step_index,
            option_ids: Vec::new(),
        }
    }

    /// Targets only the listed options within the step.
    pub fn options(step_index: usize, option_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            step_index,
            option_ids: option_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// A concrete `(step, option)` pair a constraint effect lands on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectTarget {
    pub step_index: usize,
    pub option_id: String,
}

impl EffectTarget {
    pub fn new(step_index: usize, option_id: impl Into<String>) -> Self {
        Self {
            step_index,
            option_id: option_id.into(),
        }
    }

    /// Grouping key used by the conflict resolver.
    pub fn key(&self) -> String {
        format!("{}:{}", self.step_index, self.option_id)
    }
}

/// An override rule attached to a constraint.
///
/// When an exception's path and external conditions both hold, its action
/// replaces the constraint's own action for that evaluation; when its
/// `targets` list is non-empty it also replaces the resolved target set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRule {
    pub id: String,
    /// Exceptions are tried highest-priority first.
    #[serde(default)]
    pub priority: i64,
    /// Path predicates that must all match.
    #[serde(default)]
    pub path: Vec<RouteCondition>,
    /// External predicates that must all hold.
    #[serde(default)]
    pub conditions: Vec<ExternalCondition>,
    /// Replacement action.
    pub action: ConstraintAction,
    /// Explicit replacement targets; empty keeps the constraint's own.
    #[serde(default)]
    pub targets: Vec<EffectTarget>,
}

impl ExceptionRule {
    pub fn new(id: impl Into<String>, action: ConstraintAction) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            path: Vec::new(),
            conditions: Vec::new(),
            action,
            targets: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_path(mut self, step_index: usize, option_id: impl Into<String>) -> Self {
        self.path.push(RouteCondition::new(step_index, option_id));
        self
    }

    pub fn with_condition(mut self, condition: ExternalCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_target(mut self, step_index: usize, option_id: impl Into<String>) -> Self {
        self.targets.push(EffectTarget::new(step_index, option_id));
        self
    }
}

/// Target-resolution semantics, one variant per constraint type.
///
/// `PreviousStep` is intentionally asymmetric: it disables the *source*
/// option when the target option is present elsewhere in the path: "this
/// choice is invalid if that other choice was made". It must not be unified
/// with `NextStep`, which disables the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ConstraintKind {
    /// Source becomes invalid when the target option is also chosen.
    PreviousStep {
        target_step: usize,
        #[serde(default)]
        target_options: Vec<String>,
    },
    /// Target option(s) receive the action when the source is chosen.
    NextStep {
        target_step: usize,
        #[serde(default)]
        target_options: Vec<String>,
    },
    /// Every listed step (or the listed options within it) receives the
    /// action. An empty list is transient mid-edit data, flagged invalid.
    RangeSkip {
        #[serde(default)]
        target_steps: Vec<SkipTarget>,
    },
    /// Like `NextStep`, but additionally gated on the constraint's external
    /// conditions holding.
    Conditional {
        target_step: usize,
        #[serde(default)]
        target_options: Vec<String>,
    },
}

/// A declarative policy over a workflow.
///
/// # Example
///
/// ```
/// use pathrule_core::{Constraint, ConstraintAction, ConstraintScope};
///
/// // Choosing express shipping (step 0) rules out pickup (step 2).
/// let c = Constraint::next_step("c-1", 0, "o-express", 2, ["o-pickup"])
///     .with_priority(40);
/// assert_eq!(c.scope, ConstraintScope::Global);
/// assert_eq!(c.action, ConstraintAction::Disable);
/// assert_eq!(c.priority, Some(40));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Generated id; key in the [`ConstraintMap`].
    pub id: String,
    pub scope: ConstraintScope,
    #[serde(flatten)]
    pub kind: ConstraintKind,
    /// The trigger: the constraint is only considered when this option is
    /// selected at this step.
    pub source_step: usize,
    pub source_option: String,
    /// All must match the path for route-based and conditional-route scopes.
    #[serde(default)]
    pub route_conditions: Vec<RouteCondition>,
    /// Evaluated against the external context; required by the
    /// conditional-route scope and the conditional kind.
    #[serde(default)]
    pub external_conditions: Vec<ExternalCondition>,
    #[serde(default)]
    pub action: ConstraintAction,
    /// Override rules, tried highest-priority first.
    #[serde(default)]
    pub exceptions: Vec<ExceptionRule>,
    /// Explicit priority; `None` falls back to the calculated default.
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Caller-supplied ISO-8601 creation stamp; the engine never reads a
    /// clock.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Constraint {
    /// Creates a global, active, disable-action constraint of the given kind.
    pub fn new(
        id: impl Into<String>,
        source_step: usize,
        source_option: impl Into<String>,
        kind: ConstraintKind,
    ) -> Self {
        Self {
            id: id.into(),
            scope: ConstraintScope::Global,
            kind,
            source_step,
            source_option: source_option.into(),
            route_conditions: Vec::new(),
            external_conditions: Vec::new(),
            action: ConstraintAction::Disable,
            exceptions: Vec::new(),
            priority: None,
            is_active: true,
            created_at: None,
        }
    }

    /// "Source is invalid if the target was also chosen."
    pub fn previous_step(
        id: impl Into<String>,
        source_step: usize,
        source_option: impl Into<String>,
        target_step: usize,
        target_options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(
            id,
            source_step,
            source_option,
            ConstraintKind::PreviousStep {
                target_step,
                target_options: target_options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// "Choosing the source acts on the target option(s)."
    pub fn next_step(
        id: impl Into<String>,
        source_step: usize,
        source_option: impl Into<String>,
        target_step: usize,
        target_options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(
            id,
            source_step,
            source_option,
            ConstraintKind::NextStep {
                target_step,
                target_options: target_options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// "Choosing the source acts on every listed step."
    pub fn range_skip(
        id: impl Into<String>,
        source_step: usize,
        source_option: impl Into<String>,
        target_steps: impl IntoIterator<Item = SkipTarget>,
    ) -> Self {
        Self::new(
            id,
            source_step,
            source_option,
            ConstraintKind::RangeSkip {
                target_steps: target_steps.into_iter().collect(),
            },
        )
    }

    /// "Choosing the source acts on the target, but only while the external
    /// conditions hold."
    pub fn conditional(
        id: impl Into<String>,
        source_step: usize,
        source_option: impl Into<String>,
        target_step: usize,
        target_options: impl IntoIterator<Item = impl Into<String>>,
        conditions: impl IntoIterator<Item = ExternalCondition>,
    ) -> Self {
        let mut constraint = Self::new(
            id,
            source_step,
            source_option,
            ConstraintKind::Conditional {
                target_step,
                target_options: target_options.into_iter().map(Into::into).collect(),
            },
        );
        constraint.external_conditions = conditions.into_iter().collect();
        constraint
    }

    pub fn with_scope(mut self, scope: ConstraintScope) -> Self {
        self.scope = scope;
        self
    }

    /// Adds a route condition and widens the scope to route-based if it was
    /// still global.
    pub fn with_route_condition(mut self, step_index: usize, option_id: impl Into<String>) -> Self {
        self.route_conditions
            .push(RouteCondition::new(step_index, option_id));
        if self.scope == ConstraintScope::Global {
            self.scope = ConstraintScope::RouteBased;
        }
        self
    }

    pub fn with_external_condition(mut self, condition: ExternalCondition) -> Self {
        self.external_conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: ConstraintAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_exception(mut self, exception: ExceptionRule) -> Self {
        self.exceptions.push(exception);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

fn default_true() -> bool {
    true
}
