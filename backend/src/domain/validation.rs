//! Declarative field validation.
//!
//! Each field carries an ordered list of [`Rule`]s: a pure predicate plus the
//! message recorded when the predicate fails. Rules are evaluated eagerly and
//! every failure accumulates into a [`ValidationReport`] mapping field names
//! to ordered message lists. When the report is non-empty, the action mutates
//! nothing and responds with the full map.
//!
//! All rules except [`required`] pass on empty input: emptiness is only the
//! required rule's concern, so optional fields stay optional.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::json;

use super::email;
use super::error::Error;
use super::password::{PASSWORD_MIN, PASSWORD_SPECIALS};

/// Age of majority enforced on birth dates.
pub const ADULT_AGE: i32 = 18;

/// A single field rule: a predicate and the message reported on failure.
pub struct Rule {
    message: String,
    check: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Rule {
    /// Build a rule from a raw predicate.
    ///
    /// Prefer the named constructors below; they apply the pass-on-empty
    /// convention for optional values.
    pub fn new(
        message: impl Into<String>,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            check: Box::new(check),
        }
    }

    fn optional(
        message: impl Into<String>,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(message, move |value| {
            value.trim().is_empty() || check(value)
        })
    }

    fn passes(&self, value: &str) -> bool {
        (self.check)(value)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("message", &self.message).finish()
    }
}

/// The value must be non-empty once trimmed.
pub fn required(message: impl Into<String>) -> Rule {
    Rule::new(message, |value| !value.trim().is_empty())
}

/// The value's character count must lie within `min..=max`.
pub fn length_between(min: usize, max: usize, message: impl Into<String>) -> Rule {
    Rule::optional(message, move |value| {
        let count = value.trim().chars().count();
        (min..=max).contains(&count)
    })
}

/// The value's character count must not exceed `max`.
pub fn max_length(max: usize, message: impl Into<String>) -> Rule {
    Rule::optional(message, move |value| value.trim().chars().count() <= max)
}

/// The value must look like an email address.
pub fn email_format(message: impl Into<String>) -> Rule {
    Rule::optional(message, |value| email::looks_like_email(value.trim()))
}

/// The value must contain at least one alphanumeric character.
pub fn not_only_punctuation(message: impl Into<String>) -> Rule {
    Rule::optional(message, |value| value.chars().any(char::is_alphanumeric))
}

/// The value must satisfy the password complexity policy.
pub fn password_complexity(message: impl Into<String>) -> Rule {
    Rule::optional(message, meets_password_complexity)
}

/// Password complexity policy: at least [`PASSWORD_MIN`] characters with one
/// lowercase letter, one uppercase letter, one digit and one special
/// character, drawn only from letters, digits and [`PASSWORD_SPECIALS`].
pub fn meets_password_complexity(value: &str) -> bool {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;
    for c in value.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            _ if PASSWORD_SPECIALS.contains(c) => special = true,
            _ => return false,
        }
    }
    value.chars().count() >= PASSWORD_MIN && lower && upper && digit && special
}

/// Whether `birth_date` corresponds to an age of at least [`ADULT_AGE`] on
/// `today`, subtracting a year when this year's birthday has not yet
/// occurred.
pub fn is_of_age(birth_date: NaiveDate, today: NaiveDate) -> bool {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age >= ADULT_AGE
}

/// Whether `date` lies strictly after `today`.
pub fn is_future(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

/// Accumulated validation failures: field name → ordered messages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    /// Start an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Evaluate every rule against `value`, recording each failure.
    pub fn check(&mut self, field: &str, value: &str, rules: &[Rule]) {
        for rule in rules {
            if !rule.passes(value) {
                self.add(field, rule.message.clone());
            }
        }
    }

    /// Whether no failures were recorded.
    pub fn is_valid(&self) -> bool {
        self.fields.is_empty()
    }

    /// The accumulated field → messages map.
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Convert a non-empty report into the domain error the adapters return.
    pub fn into_error(self) -> Error {
        Error::invalid_request("One or more fields failed validation.")
            .with_details(json!({ "fields": self.fields }))
    }
}
