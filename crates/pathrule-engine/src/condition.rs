//! External condition evaluation.
//!
//! A pure predicate over the caller-supplied [`ExternalContext`]: no
//! defaults are read from anywhere else, and a malformed condition simply
//! fails instead of erroring.

use pathrule_core::{ConditionField, ConditionOperator, ExternalCondition, ExternalContext};
use serde_json::Value;

/// Evaluates a single condition against the context.
///
/// `inventory` and `user_level` resolve to numbers, `date` and `time` to
/// strings. For `custom`, the condition's own value names the flag to look
/// up; equality-style operators then test the flag's truthiness (the flag
/// carries no separate comparison value).
///
/// Ordering operators coerce both sides to `f64` and fail the condition when
/// either side is not numeric. String operators compare lower-cased strings.
pub fn evaluate_condition(condition: &ExternalCondition, ctx: &ExternalContext) -> bool {
    let context_value = match condition.field {
        ConditionField::Inventory => Value::from(ctx.inventory),
        ConditionField::UserLevel => Value::from(ctx.user_level),
        ConditionField::Date => Value::from(ctx.date.clone()),
        ConditionField::Time => Value::from(ctx.time.clone()),
        ConditionField::Custom => return evaluate_custom(condition, ctx),
    };

    apply_operator(condition.operator, &context_value, &condition.value)
}

/// Evaluates a list of conditions; AND-only, empty list holds.
pub fn evaluate_conditions(conditions: &[ExternalCondition], ctx: &ExternalContext) -> bool {
    conditions.iter().all(|c| evaluate_condition(c, ctx))
}

fn evaluate_custom(condition: &ExternalCondition, ctx: &ExternalContext) -> bool {
    let key = as_string(&condition.value);
    let flag = ctx.custom.get(&key);
    let truthy = flag.is_some_and(is_truthy);
    match condition.operator {
        ConditionOperator::Equal | ConditionOperator::Contains => truthy,
        ConditionOperator::NotEqual | ConditionOperator::NotContains => !truthy,
        // Ordering operators have no comparison value for custom flags.
        _ => false,
    }
}

fn apply_operator(operator: ConditionOperator, context_value: &Value, condition_value: &Value) -> bool {
    match operator {
        ConditionOperator::GreaterOrEqual => compare_numeric(context_value, condition_value, |o| o >= 0.0),
        ConditionOperator::LessOrEqual => compare_numeric(context_value, condition_value, |o| o <= 0.0),
        ConditionOperator::GreaterThan => compare_numeric(context_value, condition_value, |o| o > 0.0),
        ConditionOperator::LessThan => compare_numeric(context_value, condition_value, |o| o < 0.0),
        ConditionOperator::Equal => loosely_equal(context_value, condition_value),
        ConditionOperator::NotEqual => !loosely_equal(context_value, condition_value),
        ConditionOperator::Contains => {
            as_string_lower(context_value).contains(&as_string_lower(condition_value))
        }
        ConditionOperator::NotContains => {
            !as_string_lower(context_value).contains(&as_string_lower(condition_value))
        }
    }
}

fn compare_numeric(a: &Value, b: &Value, check: impl Fn(f64) -> bool) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => check(x - y),
        _ => false,
    }
}

/// Numeric when both sides coerce to numbers, lower-cased string otherwise.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => as_string_lower(a) == as_string_lower(b),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn as_string_lower(value: &Value) -> String {
    as_string(value).to_lowercase()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
