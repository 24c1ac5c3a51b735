//! Structural validation of constraints against the current steps.
//!
//! Invalid constraints are data, not errors: they land in the `invalid`
//! bucket with derived flags for the caller to render ("unused" in a policy
//! list, for example). Nothing is deleted unless the caller opts into
//! [`clean_invalid_constraints`].

use pathrule_core::{Constraint, ConstraintKind, ConstraintMap, Step};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One structural problem found in a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "kebab-case")]
pub enum ValidationIssue {
    SourceStepMissing { step_index: usize },
    SourceOptionMissing { step_index: usize, option_id: String },
    TargetStepMissing { step_index: usize },
    TargetOptionMissing { step_index: usize, option_id: String },
    /// A range-skip with no target steps at all.
    MissingTargetSteps,
    /// A next-step/previous-step/conditional with an empty target option list.
    MissingTargetOptions,
    /// A conditional kind with no external conditions.
    MissingExternalConditions,
    RouteStepMissing { step_index: usize },
    RouteOptionMissing { step_index: usize, option_id: String },
}

/// A constraint that failed validation, with derived flags for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidConstraint {
    pub constraint: Constraint,
    /// The trigger references a step or option that no longer exists.
    pub source_missing: bool,
    /// At least one target references a step or option that no longer
    /// exists, or the type's required target fields are absent.
    pub target_missing: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Constraint set split into structurally valid and invalid buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: ConstraintMap,
    pub invalid: Vec<InvalidConstraint>,
}

/// Splits a constraint set by structural validity against the steps.
pub fn validate_constraints(constraints: &ConstraintMap, steps: &[Step]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (id, constraint) in constraints {
        let issues = check_constraint(constraint, steps);
        if issues.is_empty() {
            report.valid.insert(id.clone(), constraint.clone());
        } else {
            debug!(event = "constraint_invalid", constraint_id = %id, issue_count = issues.len());
            report.invalid.push(InvalidConstraint {
                source_missing: issues.iter().any(is_source_issue),
                target_missing: issues.iter().any(is_target_issue),
                issues,
                constraint: constraint.clone(),
            });
        }
    }

    report
}

/// Filters to the structurally valid subset. Opt-in: callers that prefer to
/// keep invalid constraints visible simply never call this.
pub fn clean_invalid_constraints(constraints: &ConstraintMap, steps: &[Step]) -> ConstraintMap {
    validate_constraints(constraints, steps).valid
}

fn check_constraint(constraint: &Constraint, steps: &[Step]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match steps.get(constraint.source_step) {
        None => issues.push(ValidationIssue::SourceStepMissing {
            step_index: constraint.source_step,
        }),
        Some(step) if !step.has_option(&constraint.source_option) => {
            issues.push(ValidationIssue::SourceOptionMissing {
                step_index: constraint.source_step,
                option_id: constraint.source_option.clone(),
            });
        }
        Some(_) => {}
    }

    match &constraint.kind {
        ConstraintKind::PreviousStep {
            target_step,
            target_options,
        }
        | ConstraintKind::NextStep {
            target_step,
            target_options,
        } => {
            check_target_step(*target_step, target_options, steps, &mut issues);
        }
        ConstraintKind::RangeSkip { target_steps } => {
            if target_steps.is_empty() {
                issues.push(ValidationIssue::MissingTargetSteps);
            }
            for skip in target_steps {
                match steps.get(skip.step_index) {
                    None => issues.push(ValidationIssue::TargetStepMissing {
                        step_index: skip.step_index,
                    }),
                    Some(step) => {
                        for option_id in &skip.option_ids {
                            if !step.has_option(option_id) {
                                issues.push(ValidationIssue::TargetOptionMissing {
                                    step_index: skip.step_index,
                                    option_id: option_id.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        ConstraintKind::Conditional {
            target_step,
            target_options,
        } => {
            check_target_step(*target_step, target_options, steps, &mut issues);
            if constraint.external_conditions.is_empty() {
                issues.push(ValidationIssue::MissingExternalConditions);
            }
        }
    }

    for rc in &constraint.route_conditions {
        match steps.get(rc.step_index) {
            None => issues.push(ValidationIssue::RouteStepMissing {
                step_index: rc.step_index,
            }),
            Some(step) if !step.has_option(&rc.option_id) => {
                issues.push(ValidationIssue::RouteOptionMissing {
                    step_index: rc.step_index,
                    option_id: rc.option_id.clone(),
                });
            }
            Some(_) => {}
        }
    }

    issues
}

fn check_target_step(
    target_step: usize,
    target_options: &[String],
    steps: &[Step],
    issues: &mut Vec<ValidationIssue>,
) {
    match steps.get(target_step) {
        None => issues.push(ValidationIssue::TargetStepMissing {
            step_index: target_step,
        }),
        Some(step) => {
            if target_options.is_empty() {
                issues.push(ValidationIssue::MissingTargetOptions);
            }
            for option_id in target_options {
                if !step.has_option(option_id) {
                    issues.push(ValidationIssue::TargetOptionMissing {
                        step_index: target_step,
                        option_id: option_id.clone(),
                    });
                }
            }
        }
    }
}

fn is_source_issue(issue: &ValidationIssue) -> bool {
    matches!(
        issue,
        ValidationIssue::SourceStepMissing { .. } | ValidationIssue::SourceOptionMissing { .. }
    )
}

fn is_target_issue(issue: &ValidationIssue) -> bool {
    matches!(
        issue,
        ValidationIssue::TargetStepMissing { .. }
            | ValidationIssue::TargetOptionMissing { .. }
            | ValidationIssue::MissingTargetSteps
            | ValidationIssue::MissingTargetOptions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrule_core::{ConditionField, ConditionOperator, ExternalCondition, SkipTarget};
    use pathrule_test::{constraint_map as map_of, three_step_sheet as steps};

    #[test]
    fn test_valid_constraint_passes() {
        let constraints = map_of(vec![Constraint::next_step("c1", 0, "a1", 2, ["c1"])]);
        let report = validate_constraints(&constraints, &steps());
        assert_eq!(report.valid.len(), 1);
        assert!(report.invalid.is_empty());
    }

    #[test]
    fn test_missing_source_sets_flag() {
        let constraints = map_of(vec![Constraint::next_step("c1", 9, "a1", 2, ["c1"])]);
        let report = validate_constraints(&constraints, &steps());
        assert!(report.valid.is_empty());
        let invalid = &report.invalid[0];
        assert!(invalid.source_missing);
        assert!(!invalid.target_missing);
        assert_eq!(
            invalid.issues,
            vec![ValidationIssue::SourceStepMissing { step_index: 9 }]
        );
    }

    #[test]
    fn test_range_skip_requires_target_steps() {
        let constraints = map_of(vec![Constraint::range_skip("c1", 0, "a1", [])]);
        let report = validate_constraints(&constraints, &steps());
        let invalid = &report.invalid[0];
        assert!(invalid.target_missing);
        assert!(invalid
            .issues
            .contains(&ValidationIssue::MissingTargetSteps));
    }

    #[test]
    fn test_conditional_requires_conditions_and_targets() {
        let no_conditions = Constraint::conditional("c1", 0, "a1", 2, ["c1"], Vec::new());
        let no_targets = Constraint::conditional(
            "c2",
            0,
            "a1",
            2,
            Vec::<String>::new(),
            [ExternalCondition::new(
                ConditionField::Inventory,
                ConditionOperator::GreaterThan,
                0,
            )],
        );
        let report = validate_constraints(&map_of(vec![no_conditions, no_targets]), &steps());
        assert_eq!(report.invalid.len(), 2);
        assert!(report.invalid[0]
            .issues
            .contains(&ValidationIssue::MissingExternalConditions));
        assert!(report.invalid[1]
            .issues
            .contains(&ValidationIssue::MissingTargetOptions));
    }

    #[test]
    fn test_dangling_route_condition_is_flagged() {
        let constraints = map_of(vec![
            Constraint::next_step("c1", 0, "a1", 2, ["c1"]).with_route_condition(1, "deleted")
        ]);
        let report = validate_constraints(&constraints, &steps());
        assert_eq!(
            report.invalid[0].issues,
            vec![ValidationIssue::RouteOptionMissing {
                step_index: 1,
                option_id: "deleted".into()
            }]
        );
    }

    #[test]
    fn test_clean_filters_to_valid_subset() {
        let constraints = map_of(vec![
            Constraint::next_step("ok", 0, "a1", 2, ["c1"]),
            Constraint::range_skip("broken", 0, "a1", [SkipTarget::whole_step(7)]),
        ]);
        let cleaned = clean_invalid_constraints(&constraints, &steps());
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned.contains_key("ok"));
    }
}
