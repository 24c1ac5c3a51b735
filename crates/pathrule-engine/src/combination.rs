//! Full enumeration of the paths through a workflow.

use pathrule_core::{Combination, Step};
use smallvec::SmallVec;
use tracing::trace;

/// Generates the full Cartesian product of every step's option list.
///
/// The left-most step is the outer loop: its option varies slowest, the last
/// step's option varies fastest. A combination's position in the returned
/// list is its stable path key. A workflow with no steps, or with any step
/// that has no options, has no paths.
///
/// Inactive options are still enumerated; activity is a baseline concern
/// merged later by the activation generator, not a structural filter.
pub fn generate_combinations(steps: &[Step]) -> Vec<Combination> {
    if steps.is_empty() || steps.iter().any(|s| s.options.is_empty()) {
        return Vec::new();
    }

    let total = steps
        .iter()
        .map(|s| s.options.len())
        .product::<usize>();
    let mut combinations = Vec::with_capacity(total);

    // Odometer over per-step option indices; the last digit turns fastest.
    let mut cursor: SmallVec<[usize; 8]> = SmallVec::from_elem(0, steps.len());
    loop {
        combinations.push(Combination::new(
            cursor
                .iter()
                .zip(steps)
                .map(|(&option_idx, step)| step.options[option_idx].id.clone())
                .collect(),
        ));

        let mut digit = steps.len();
        loop {
            if digit == 0 {
                trace!(event = "combinations_generated", count = combinations.len());
                return combinations;
            }
            digit -= 1;
            cursor[digit] += 1;
            if cursor[digit] < steps[digit].options.len() {
                break;
            }
            cursor[digit] = 0;
        }
    }
}

/// Computes `∏ |options_i|` without enumerating.
///
/// The engine never bounds the enumeration itself; callers compare this
/// against their own cap (for example the `max_combinations` limit from
/// `pathrule-config`) before calling [`generate_combinations`].
pub fn combination_count(steps: &[Step]) -> u128 {
    if steps.is_empty() {
        return 0;
    }
    steps
        .iter()
        .map(|s| s.options.len() as u128)
        .fold(1u128, u128::saturating_mul)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrule_test::{sheet, step};

    #[test]
    fn test_product_is_complete_and_distinct() {
        let steps = sheet(&[("a", &["a1", "a2"]), ("b", &["b1", "b2", "b3"])]);
        let combos = generate_combinations(&steps);
        assert_eq!(combos.len(), 6);
        assert_eq!(combination_count(&steps), 6);
        let mut seen = std::collections::BTreeSet::new();
        for combo in &combos {
            assert_eq!(combo.len(), 2);
            assert!(seen.insert(combo.options.clone()), "duplicate tuple");
        }
    }

    #[test]
    fn test_leftmost_step_varies_slowest() {
        let steps = sheet(&[("a", &["a1", "a2"]), ("b", &["b1", "b2"])]);
        let combos = generate_combinations(&steps);
        let options: Vec<_> = combos.iter().map(|c| c.options.clone()).collect();
        assert_eq!(
            options,
            vec![
                vec!["a1".to_string(), "b1".to_string()],
                vec!["a1".to_string(), "b2".to_string()],
                vec!["a2".to_string(), "b1".to_string()],
                vec!["a2".to_string(), "b2".to_string()],
            ]
        );
    }

    #[test]
    fn test_empty_inputs_have_no_paths() {
        assert!(generate_combinations(&[]).is_empty());
        assert_eq!(combination_count(&[]), 0);

        let steps = vec![step("a", &["a1"]), step("b", &[])];
        assert!(generate_combinations(&steps).is_empty());
        assert_eq!(combination_count(&steps), 0);
    }
}
