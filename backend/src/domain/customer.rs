//! Customer records: the entity, incoming drafts, and their validation rules.

use std::sync::OnceLock;

use regex::Regex;

use super::email::{EMAIL_MAX, Email};
use super::ids::CustomerId;
use super::validation::{
    Rule, ValidationReport, email_format, length_between, max_length, not_only_punctuation,
    required,
};

/// Maximum accepted length for a customer address.
pub const ADDRESS_MAX: usize = 200;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // Digits with the usual separators; length bounds included.
        let pattern = r"^[0-9+()\s\-]{7,20}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// A persisted customer.
///
/// ## Invariants
/// - `email` is unique across customers, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Stable identifier.
    pub id: CustomerId,
    /// Customer name.
    pub name: String,
    /// Unique, normalised email address.
    pub email: Email,
    /// Postal address, when known.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: String,
}

/// Incoming payload for creating or editing a customer.
#[derive(Debug, Clone)]
pub struct CustomerDraft {
    /// Proposed name.
    pub name: String,
    /// Proposed email address, raw form.
    pub email: String,
    /// Postal address, optional.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: String,
}

/// Validate a customer draft. Uniqueness is checked separately against the
/// repository.
pub fn validate_customer_draft(draft: &CustomerDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.check(
        "name",
        &draft.name,
        &[
            required("Name is required."),
            length_between(2, 100, "Name must be between 2 and 100 characters."),
            not_only_punctuation("Enter a valid name (not just punctuation)."),
        ],
    );
    report.check(
        "email",
        &draft.email,
        &[
            required("Email is required."),
            email_format("Invalid email format."),
            max_length(EMAIL_MAX, format!("Email must not exceed {EMAIL_MAX} characters.")),
        ],
    );
    report.check(
        "phone",
        &draft.phone,
        &[
            required("Phone is required."),
            Rule::new("Enter a valid phone number.", |value| {
                value.trim().is_empty() || phone_regex().is_match(value.trim())
            }),
        ],
    );
    if let Some(address) = &draft.address {
        report.check(
            "address",
            address,
            &[max_length(
                ADDRESS_MAX,
                format!("Address must not exceed {ADDRESS_MAX} characters."),
            )],
        );
    }
    report
}
