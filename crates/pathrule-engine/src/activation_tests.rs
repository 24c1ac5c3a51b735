use pathrule_core::{
    ConditionField, ConditionOperator, Constraint, ConstraintAction, ExceptionRule,
    ExternalCondition, ExternalContext, PathActivationMap, Selection,
};
use pathrule_test::{constraint_map, three_step_sheet};

use crate::activation::{generate_path_activations, generate_path_activations_with_baseline};
use crate::combination::generate_combinations;
use crate::priority::apply_constraints_with_priority;

#[test]
fn test_identical_inputs_yield_identical_output() {
    let steps = three_step_sheet();
    let constraints = constraint_map([
        Constraint::next_step("c1", 0, "a1", 2, ["c1"]),
        Constraint::previous_step("c2", 0, "a2", 1, ["b2"]),
    ]);
    let ctx = ExternalContext::default().with_inventory(7);

    let first = generate_path_activations(&steps, &constraints, &ctx);
    let second = generate_path_activations(&steps, &constraints, &ctx);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_global_constraint_disables_in_every_matching_path() {
    let steps = three_step_sheet();
    let constraints = constraint_map([Constraint::next_step("c1", 0, "a1", 2, ["c1"])]);
    let ctx = ExternalContext::default();

    let activations = generate_path_activations(&steps, &constraints, &ctx);
    let combinations = generate_combinations(&steps);
    assert_eq!(activations.len(), 8);

    for (index, combination) in combinations.iter().enumerate() {
        let vector = &activations[&index.to_string()];
        let source_selected = combination.options[0] == "a1";
        let target_selected = combination.options[2] == "c1";
        let expected = !(source_selected && target_selected);
        assert_eq!(vector[2], expected, "path {index}");
        // Other steps are untouched by a next-step constraint.
        assert!(vector[0] && vector[1], "path {index}");
    }
}

#[test]
fn test_route_condition_narrows_to_matching_paths() {
    let steps = three_step_sheet();
    let constraints = constraint_map([
        Constraint::next_step("c1", 0, "a1", 2, ["c1"]).with_route_condition(1, "b1")
    ]);
    let activations = generate_path_activations(&steps, &constraints, &ExternalContext::default());
    let combinations = generate_combinations(&steps);

    for (index, combination) in combinations.iter().enumerate() {
        let vector = &activations[&index.to_string()];
        let is_narrowed_path = combination.options == ["a1", "b1", "c1"];
        assert_eq!(vector[2], !is_narrowed_path, "path {index}");
    }
}

#[test]
fn test_previous_step_disables_the_source_step() {
    let steps = three_step_sheet();
    let constraints = constraint_map([Constraint::previous_step("c1", 0, "a1", 1, ["b1"])]);
    let activations = generate_path_activations(&steps, &constraints, &ExternalContext::default());
    let combinations = generate_combinations(&steps);

    for (index, combination) in combinations.iter().enumerate() {
        let vector = &activations[&index.to_string()];
        let both_chosen = combination.options[0] == "a1" && combination.options[1] == "b1";
        // The SOURCE step goes inactive, never the target step.
        assert_eq!(vector[0], !both_chosen, "path {index}");
        assert!(vector[1], "path {index}");
    }
}

#[test]
fn test_baseline_merge_is_an_and() {
    let steps = three_step_sheet();
    let constraints = constraint_map([Constraint::next_step("c1", 0, "a1", 2, ["c1"])]);
    let ctx = ExternalContext::default();

    let mut baseline = PathActivationMap::new();
    baseline.insert("5".to_string(), vec![true, false, true]);

    let merged = generate_path_activations_with_baseline(&steps, &constraints, &ctx, &baseline);
    // Manual toggle carried through on the targeted path...
    assert_eq!(merged["5"], vec![true, false, true]);
    // ...while constraint-driven deactivation is unaffected elsewhere.
    assert_eq!(merged["0"], vec![true, true, false]);
}

#[test]
fn test_inactive_constraints_are_ignored() {
    let steps = three_step_sheet();
    let constraints =
        constraint_map([Constraint::next_step("c1", 0, "a1", 2, ["c1"]).with_active(false)]);
    let activations = generate_path_activations(&steps, &constraints, &ExternalContext::default());
    assert!(activations.values().all(|v| v.iter().all(|&b| b)));
}

#[test]
fn test_conditional_kind_is_gated_on_context() {
    let steps = three_step_sheet();
    let constraints = constraint_map([Constraint::conditional(
        "c1",
        0,
        "a1",
        2,
        ["c1"],
        [ExternalCondition::new(
            ConditionField::Inventory,
            ConditionOperator::LessThan,
            5,
        )],
    )]);

    let low_stock = ExternalContext::default().with_inventory(2);
    let activations = generate_path_activations(&steps, &constraints, &low_stock);
    assert_eq!(activations["0"], vec![true, true, false]);

    let in_stock = ExternalContext::default().with_inventory(50);
    let activations = generate_path_activations(&steps, &constraints, &in_stock);
    assert!(activations.values().all(|v| v.iter().all(|&b| b)));
}

#[test]
fn test_exception_lifting_the_action_keeps_the_path_active() {
    let steps = three_step_sheet();
    let constraints = constraint_map([Constraint::next_step("c1", 0, "a1", 2, ["c1"])
        .with_exception(
            ExceptionRule::new("allow-b2", ConstraintAction::Enable).with_path(1, "b2"),
        )]);
    let activations = generate_path_activations(&steps, &constraints, &ExternalContext::default());

    // (a1, b1, c1): the base disable stands.
    assert_eq!(activations["0"], vec![true, true, false]);
    // (a1, b2, c1): the exception flips the action to enable, which cannot
    // force anything off in whole-path mode.
    assert_eq!(activations["2"], vec![true, true, true]);
}

#[test]
fn test_whole_path_mode_agrees_with_live_mode() {
    let steps = three_step_sheet();
    let constraints = constraint_map([
        Constraint::next_step("c1", 0, "a1", 2, ["c1"]),
        Constraint::next_step("c2", 1, "b2", 2, ["c2"]).with_route_condition(0, "a2"),
        Constraint::previous_step("c3", 0, "a2", 1, ["b1"]),
    ]);
    let ctx = ExternalContext::default();

    let activations = generate_path_activations(&steps, &constraints, &ctx);
    for (index, combination) in generate_combinations(&steps).iter().enumerate() {
        // Treat the full path as a completed live selection.
        let mut selection = Selection::new();
        for (step_index, option_id) in combination.options.iter().enumerate() {
            selection.select(step_index, option_id.clone());
        }
        let resolution = apply_constraints_with_priority(&steps, &constraints, &selection, &ctx);

        let vector = &activations[&index.to_string()];
        for (step_index, option_id) in combination.options.iter().enumerate() {
            let disabled_live = resolution
                .disabled_options
                .get(&step_index)
                .is_some_and(|set| set.contains(option_id));
            assert_eq!(
                !vector[step_index], disabled_live,
                "path {index}, step {step_index}"
            );
        }
    }
}
