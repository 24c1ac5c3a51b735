//! Workflow fixtures.

use pathrule_core::{Step, StepOption};

/// Builds a step whose option ids double as their names.
pub fn step(name: &str, option_ids: &[&str]) -> Step {
    let mut step = Step::new(format!("step-{name}"), name);
    for id in option_ids {
        step = step.with_option(StepOption::new(*id, *id));
    }
    step
}

/// Builds a workflow from `(step name, option ids)` pairs.
pub fn sheet(specs: &[(&str, &[&str])]) -> Vec<Step> {
    specs.iter().map(|(name, options)| step(name, options)).collect()
}

/// The canonical three-step workflow used across engine tests:
/// `A:{a1,a2}  B:{b1,b2}  C:{c1,c2}`, eight paths in total.
pub fn three_step_sheet() -> Vec<Step> {
    sheet(&[("a", &["a1", "a2"]), ("b", &["b1", "b2"]), ("c", &["c1", "c2"])])
}
