//! The built-in value equality rule.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

/// Built-in equality: strict structural equality, with an instant-level
/// fallback when both operands are date/time-like.
///
/// Two RFC 3339 strings naming the same instant compare equal even when
/// their offsets differ. A date/time-like operand never equals a value
/// that is not itself date/time-like.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }

    match (as_instant(left), as_instant(right)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Parse a value as an RFC 3339 instant, when it is one.
fn as_instant(value: &Value) -> Option<DateTime<FixedOffset>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Whether a value is a keyed collection (array or object).
pub(crate) fn is_collection(value: &Value) -> bool {
    value.is_array() || value.is_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_values_are_equal() {
        assert!(values_equal(&json!("foo"), &json!("foo")));
        assert!(values_equal(&json!(1), &json!(1)));
        assert!(values_equal(&json!(null), &json!(null)));
        assert!(values_equal(&json!([1, 2]), &json!([1, 2])));
    }

    #[test]
    fn test_equality_is_type_sensitive() {
        assert!(!values_equal(&json!(1), &json!("1")));
        assert!(!values_equal(&json!(0), &json!(false)));
        assert!(!values_equal(&json!(null), &json!("")));
    }

    #[test]
    fn test_same_instant_in_different_offsets_is_equal() {
        let utc = json!("2020-01-01T00:00:00Z");
        let ny = json!("2019-12-31T19:00:00-05:00");
        assert!(values_equal(&utc, &ny));
    }

    #[test]
    fn test_different_instants_are_not_equal() {
        let a = json!("2020-01-01T00:00:00Z");
        let b = json!("2020-01-01T00:00:01Z");
        assert!(!values_equal(&a, &b));
    }

    #[test]
    fn test_instant_never_equals_a_plain_string() {
        let instant = json!("2020-01-01T00:00:00Z");
        assert!(!values_equal(&instant, &json!("not a date")));
        assert!(!values_equal(&json!("not a date"), &instant));
    }

    #[test]
    fn test_is_collection() {
        assert!(is_collection(&json!([])));
        assert!(is_collection(&json!({})));
        assert!(!is_collection(&json!(null)));
        assert!(!is_collection(&json!("foo")));
        assert!(!is_collection(&json!(1)));
    }
}
