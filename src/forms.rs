use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

/// Per-field error messages, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First message for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Posted form values plus the validation errors collected against them.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: HashMap<String, String>,
    pub errors: FieldErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FieldErrors::default(),
        }
    }

    /// Value of `field`, or the empty string when absent.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// True when `field` was posted with a non-empty value.
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field cannot be blank");
            }
        }
    }

    pub fn min_length(&mut self, field: &str, length: usize) -> bool {
        if self.get(field).trim().chars().count() < length {
            self.errors.add(
                field,
                format!("This field must be at least {length} characters long"),
            );
            return false;
        }
        true
    }

    pub fn is_email(&mut self, field: &str) {
        if !email_regex().is_match(self.get(field).trim()) {
            self.errors.add(field, "Invalid email address");
        }
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Form {
        Form::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_empty_form_is_valid() {
        assert!(form(&[]).valid());
    }

    #[test]
    fn test_required_rejects_blank() {
        let mut f = form(&[("a", "x"), ("b", "   ")]);
        f.required(&["a", "b", "c"]);
        assert!(!f.valid());
        assert_eq!(f.errors.get("a"), None);
        assert_eq!(f.errors.get("b"), Some("This field cannot be blank"));
        assert!(f.errors.get("c").is_some());
    }

    #[test]
    fn test_min_length() {
        let mut f = form(&[("first_name", "J")]);
        assert!(!f.min_length("first_name", 3));
        assert_eq!(
            f.errors.get("first_name"),
            Some("This field must be at least 3 characters long")
        );

        let mut ok = form(&[("first_name", "Joe")]);
        assert!(ok.min_length("first_name", 3));
        assert!(ok.valid());
    }

    #[test]
    fn test_is_email() {
        let mut good = form(&[("email", "guest@example.com")]);
        good.is_email("email");
        assert!(good.valid());

        for bad in ["", "guest", "guest@", "guest@example", "@example.com"] {
            let mut f = form(&[("email", bad)]);
            f.is_email("email");
            assert!(!f.valid(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_has() {
        let f = form(&[("add_block_1_2050-01-01", "1"), ("empty", "")]);
        assert!(f.has("add_block_1_2050-01-01"));
        assert!(!f.has("empty"));
        assert!(!f.has("missing"));
    }

    #[test]
    fn test_first_error_wins() {
        let mut f = form(&[("first_name", "")]);
        f.required(&["first_name"]);
        f.min_length("first_name", 3);
        assert_eq!(f.errors.get("first_name"), Some("This field cannot be blank"));
    }
}
