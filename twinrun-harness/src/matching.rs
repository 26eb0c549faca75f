//! Predicates and message formatting used by the assertion operations.

use serde_json::Value;

/// Upper bound on the width of a header border.
pub(crate) const MAX_HEADER_WIDTH: usize = 80;

/// Strict equality between two operands: values of different kinds are never
/// equal, numbers compare by numeric value, and containers compare element-wise.
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => numbers_equal(l, r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| strict_equals(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter().all(|(key, a)| r.get(key).is_some_and(|b| strict_equals(a, b)))
        }
        _ => left == right,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(left: &serde_json::Number, right: &serde_json::Number) -> bool {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return l == r;
    }

    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Renders an operand for a synthesized message. Numbers and booleans appear
/// bare; everything else is single-quoted.
pub(crate) fn render_operand(value: &Value) -> String {
    match value {
        Value::Number(n) => render_number(n),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => format!("'{s}'"),
        other => format!("'{other}'"),
    }
}

/// Floats go through `f64`'s own formatting, which drops the fractional part
/// of whole values (`2`, not `2.0`).
fn render_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// Shallow two-dimensional check: an array whose first element is an array.
pub(crate) fn is_2d_array(value: &Value) -> bool {
    match value {
        Value::Array(rows) => matches!(rows.first(), Some(Value::Array(_))),
        _ => false,
    }
}

/// Border line for a header around `text`.
pub(crate) fn header_border(text: &str) -> String {
    "*".repeat((text.chars().count() + 4).min(MAX_HEADER_WIDTH))
}

/// Describes a mismatch between a thrown error and what was expected; `None`
/// when both the type and the message matched.
pub(crate) fn describe_error_mismatch(
    type_mismatch: Option<(&str, &str)>,
    message_mismatch: Option<(&str, &str)>,
) -> Option<String> {
    let type_part = type_mismatch
        .map(|(actual, expected)| format!("wrong error type: '{actual}' != '{expected}'"));
    let message_part = message_mismatch
        .map(|(actual, pattern)| format!("wrong error message: '{actual}' != '{pattern}'"));

    match (type_part, message_part) {
        (Some(t), Some(m)) => Some(format!("{t} and {m}")),
        (Some(part), None) | (None, Some(part)) => Some(part),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strict_equality_does_not_coerce() {
        assert!(!strict_equals(&json!(1), &json!("1")));
        assert!(!strict_equals(&json!(0), &json!(false)));
        assert!(!strict_equals(&json!(null), &json!("")));
        assert!(strict_equals(&json!("two"), &json!("two")));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(strict_equals(&json!(1), &json!(1.0)));
        assert!(strict_equals(&json!(-3), &json!(-3)));
        assert!(!strict_equals(&json!(2), &json!(2.5)));
    }

    #[test]
    fn containers_compare_structurally() {
        assert!(strict_equals(&json!([1, [2.0]]), &json!([1.0, [2]])));
        assert!(!strict_equals(&json!([1, 2]), &json!([1])));
        assert!(strict_equals(&json!({"a": 1}), &json!({"a": 1.0})));
        assert!(!strict_equals(&json!({"a": 1}), &json!({"b": 1})));
    }

    #[test]
    fn operands_are_quoted_unless_numeric_or_boolean() {
        assert_eq!(render_operand(&json!(2)), "2");
        assert_eq!(render_operand(&json!(1.0 + 1.0)), "2");
        assert_eq!(render_operand(&json!(-0.5)), "-0.5");
        assert_eq!(render_operand(&json!(true)), "true");
        assert_eq!(render_operand(&json!("two")), "'two'");
        assert_eq!(render_operand(&json!(null)), "'null'");
        assert_eq!(render_operand(&json!([1, 2])), "'[1,2]'");
    }

    #[test]
    fn two_dimensional_check_is_shallow() {
        assert!(is_2d_array(&json!([[1], [2]])));
        assert!(is_2d_array(&json!([[], 3])));
        assert!(!is_2d_array(&json!([1, 2, 3])));
        assert!(!is_2d_array(&json!([])));
        assert!(!is_2d_array(&json!("[[1]]")));
    }

    #[test]
    fn header_border_tracks_text_length() {
        assert_eq!(header_border("LOCAL TESTS"), "*".repeat(15));
        assert_eq!(header_border(&"x".repeat(200)).len(), MAX_HEADER_WIDTH);
    }

    #[test]
    fn error_mismatch_descriptions() {
        assert_eq!(describe_error_mismatch(None, None), None);
        assert_eq!(
            describe_error_mismatch(Some(("TypeError", "RangeError")), None).as_deref(),
            Some("wrong error type: 'TypeError' != 'RangeError'")
        );
        assert_eq!(
            describe_error_mismatch(
                Some(("TypeError", "RangeError")),
                Some(("TypeError: bad", "good"))
            )
            .as_deref(),
            Some(
                "wrong error type: 'TypeError' != 'RangeError' and \
                 wrong error message: 'TypeError: bad' != 'good'"
            )
        );
    }
}
