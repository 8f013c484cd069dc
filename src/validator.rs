//! Field-error accumulator used by request validation.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Collects at most one message per field. The first failure for a field wins.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no error has been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// True when `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.iter().any(|p| p == value)
}

/// True when every element of `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validator_is_valid() {
        let v = Validator::new();
        assert!(v.valid());
        assert!(v.errors().is_empty());
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut v = Validator::new();
        v.add_error("field1", "error1");
        v.add_error("field1", "error2");
        v.add_error("field2", "error3");

        assert!(!v.valid());
        assert_eq!(v.errors().len(), 2);
        assert_eq!(v.errors()["field1"], "error1");
        assert_eq!(v.errors()["field2"], "error3");
    }

    #[test]
    fn check_records_only_failures() {
        let mut v = Validator::new();
        v.check(true, "name", "must be provided");
        assert!(v.valid());

        v.check(false, "name", "must be provided");
        v.check(false, "name", "must be short");
        assert_eq!(v.into_errors().get("name").map(String::as_str), Some("must be provided"));
    }

    #[test]
    fn permitted_value_matches_members() {
        assert!(permitted_value(&"b", &["a", "b"]));
        assert!(!permitted_value(&"c", &["a", "b"]));
    }

    #[test]
    fn unique_detects_duplicates() {
        assert!(unique(&[1, 2, 3]));
        assert!(!unique(&[1, 2, 1]));
        assert!(unique::<i64>(&[]));
    }
}
