//! Pluggable value-comparison strategies.

use serde_json::Value;

/// A pluggable comparison strategy consulted by the equality rule.
///
/// Voters are registered on the mapper explicitly, in order, via
/// [`StrictMapper::with_voter`]; there is no global discovery. The first
/// voter returning a verdict decides equality for that pair of values;
/// a voter returns `None` to abstain, falling through to the next voter
/// and finally to the built-in rule (strict structural equality with the
/// date/time instant fallback).
///
/// Because a write is skipped exactly when the submitted value equals the
/// original, a voter can force a write (verdict `false`) or suppress one
/// (verdict `true`) for value shapes the built-in rule mishandles.
///
/// [`StrictMapper::with_voter`]: crate::StrictMapper::with_voter
pub trait ValueVoter {
    /// Compare two values, or abstain with `None`.
    fn vote(&self, left: &Value, right: &Value) -> Option<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CaseInsensitive;

    impl ValueVoter for CaseInsensitive {
        fn vote(&self, left: &Value, right: &Value) -> Option<bool> {
            match (left.as_str(), right.as_str()) {
                (Some(l), Some(r)) => Some(l.eq_ignore_ascii_case(r)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_voter_judges_its_own_shapes_and_abstains_otherwise() {
        let voter = CaseInsensitive;
        assert_eq!(voter.vote(&json!("Foo"), &json!("foo")), Some(true));
        assert_eq!(voter.vote(&json!("foo"), &json!("bar")), Some(false));
        assert_eq!(voter.vote(&json!(1), &json!(1)), None);
    }
}
