//! Field validators
//!
//! Synchronous checks run before any request is made. Errors are keyed by
//! field name so a front end can show them next to the field.

use regex::Regex;
use crate::utils::errors::FieldErrors;

/// Value of a form field as seen by validators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Selection(&'a [String]),
}

#[derive(Debug, Clone)]
enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    NonEmptySelection,
}

/// Validation rules of one field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    rules: Vec<(Rule, String)>,
}

impl FieldSpec {
    pub fn new(name: &'static str) -> Self {
        Self { name, rules: Vec::new() }
    }

    /// Text must be non-blank after trimming
    pub fn required(mut self, message: &str) -> Self {
        self.rules.push((Rule::Required, message.to_string()));
        self
    }

    pub fn min_length(mut self, length: usize, message: &str) -> Self {
        self.rules.push((Rule::MinLength(length), message.to_string()));
        self
    }

    pub fn max_length(mut self, length: usize, message: &str) -> Self {
        self.rules.push((Rule::MaxLength(length), message.to_string()));
        self
    }

    /// Non-empty text must match `pattern`
    pub fn pattern(mut self, pattern: &Regex, message: &str) -> Self {
        self.rules.push((Rule::Pattern(pattern.clone()), message.to_string()));
        self
    }

    /// At least one option must be selected
    pub fn non_empty(mut self, message: &str) -> Self {
        self.rules.push((Rule::NonEmptySelection, message.to_string()));
        self
    }

    /// First failing rule's message
    pub fn check(&self, value: FieldValue<'_>) -> Option<String> {
        self.rules
            .iter()
            .find(|(rule, _)| !passes(rule, value))
            .map(|(_, message)| message.clone())
    }
}

fn passes(rule: &Rule, value: FieldValue<'_>) -> bool {
    match (rule, value) {
        (Rule::Required, FieldValue::Text(text)) => !text.trim().is_empty(),
        (Rule::Required, FieldValue::Selection(items)) => !items.is_empty(),
        // Length and pattern rules leave blank optional fields alone
        (Rule::MinLength(min), FieldValue::Text(text)) => text.is_empty() || text.chars().count() >= *min,
        (Rule::MaxLength(max), FieldValue::Text(text)) => text.chars().count() <= *max,
        (Rule::Pattern(regex), FieldValue::Text(text)) => text.is_empty() || regex.is_match(text),
        (Rule::NonEmptySelection, FieldValue::Selection(items)) => !items.is_empty(),
        (Rule::NonEmptySelection, FieldValue::Text(text)) => !text.is_empty(),
        (_, FieldValue::Selection(_)) => true,
    }
}

/// A field spec paired with the current value
pub type FieldCheck<'a> = (FieldSpec, FieldValue<'a>);

/// Run every check, collecting one message per failing field
pub fn validate_fields(checks: &[FieldCheck<'_>]) -> FieldErrors {
    checks
        .iter()
        .filter_map(|(spec, value)| spec.check(*value).map(|message| (spec.name.to_string(), message)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        let spec = FieldSpec::new("name").required("Nomi kiritilishi shart");
        assert!(spec.check(FieldValue::Text("   ")).is_some());
        assert!(spec.check(FieldValue::Text("Vazirlik")).is_none());
    }

    #[test]
    fn test_length_and_pattern() {
        let login = Regex::new(r"^[A-Za-z0-9_.@-]+$").unwrap();
        let spec = FieldSpec::new("username")
            .min_length(3, "too short")
            .max_length(8, "too long")
            .pattern(&login, "bad characters");

        assert_eq!(spec.check(FieldValue::Text("ab")).as_deref(), Some("too short"));
        assert_eq!(spec.check(FieldValue::Text("abcdefghi")).as_deref(), Some("too long"));
        assert_eq!(spec.check(FieldValue::Text("ab cd")).as_deref(), Some("bad characters"));
        assert!(spec.check(FieldValue::Text("ali_v")).is_none());
    }

    #[test]
    fn test_validate_fields_collects_per_field() {
        let empty: Vec<String> = Vec::new();
        let chosen = vec!["o1".to_string()];
        let errors = validate_fields(&[
            (FieldSpec::new("name").required("required"), FieldValue::Text("")),
            (FieldSpec::new("organizations").non_empty("pick one"), FieldValue::Selection(&empty)),
            (FieldSpec::new("employees").non_empty("pick one"), FieldValue::Selection(&chosen)),
        ]);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("organizations").map(String::as_str), Some("pick one"));
    }
}
