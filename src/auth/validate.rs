//! Declarative form validation: a schema is an ordered set of fields, each
//! with ordered rules carrying their own failure message. Evaluated once per
//! submission; the first failing rule supplies the field's error.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone)]
enum Check {
    Required,
    MinLen(usize),
    MaxLen(usize),
    Email,
    /// Cross-field equality, e.g. a password confirmation field.
    Matches(&'static str),
}

#[derive(Debug, Clone)]
struct Rule {
    check: Check,
    message: &'static str,
}

/// One named field and its ordered rules.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    rules: Vec<Rule>,
}

impl Field {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    fn rule(mut self, check: Check, message: &'static str) -> Self {
        self.rules.push(Rule { check, message });
        self
    }

    pub fn required(self, message: &'static str) -> Self {
        self.rule(Check::Required, message)
    }

    pub fn email(self, message: &'static str) -> Self {
        self.rule(Check::Email, message)
    }

    pub fn min_len(self, min: usize, message: &'static str) -> Self {
        self.rule(Check::MinLen(min), message)
    }

    pub fn max_len(self, max: usize, message: &'static str) -> Self {
        self.rule(Check::MaxLen(max), message)
    }

    pub fn matches(self, other: &'static str, message: &'static str) -> Self {
        self.rule(Check::Matches(other), message)
    }
}

/// Validation failures keyed by field name, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(&'static str, &'static str)>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn first_message(&self) -> Option<&'static str> {
        self.errors.first().map(|(_, message)| *message)
    }

    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| *message)
    }
}

/// A declarative set of field rules evaluated once per submission.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Check every field against its rules. A field absent from `values` is
    /// treated as empty. Returns the first failing message per field.
    pub fn validate(&self, values: &BTreeMap<&str, &str>) -> Result<(), FieldErrors> {
        let mut errors = Vec::new();
        for field in &self.fields {
            let value = values.get(field.name).copied().unwrap_or("");
            for rule in &field.rules {
                let ok = match rule.check {
                    Check::Required => !value.trim().is_empty(),
                    Check::MinLen(min) => value.chars().count() >= min,
                    Check::MaxLen(max) => value.chars().count() <= max,
                    Check::Email => is_valid_email(value),
                    Check::Matches(other) => value == values.get(other).copied().unwrap_or(""),
                };
                if !ok {
                    errors.push((field.name, rule.message));
                    break;
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors { errors })
        }
    }
}
