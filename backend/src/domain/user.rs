//! User accounts: the entity, incoming drafts, and their validation rules.

use chrono::{DateTime, NaiveDate, Utc};

use super::email::{EMAIL_MAX, Email};
use super::ids::UserId;
use super::password::{PASSWORD_MAX, PASSWORD_MIN, PasswordHash};
use super::role::Role;
use super::validation::{
    Rule, ValidationReport, email_format, is_future, is_of_age, length_between, max_length,
    not_only_punctuation, password_complexity, required,
};

/// A persisted user account.
///
/// ## Invariants
/// - `email` is unique across users, compared case-insensitively.
/// - `birth_date` corresponded to an age of at least 18 when validated.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name, 2–100 characters with at least one alphanumeric.
    pub full_name: String,
    /// Unique, normalised email address.
    pub email: Email,
    /// Salted one-way password hash.
    pub password: PasswordHash,
    /// Authorization role.
    pub role: Role,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// When the account was created.
    pub registered_at: DateTime<Utc>,
    /// Deactivated accounts cannot sign in.
    pub active: bool,
}

/// Incoming payload for creating or editing a user.
///
/// `password` is optional on edit: when absent the stored hash is kept.
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Proposed display name.
    pub full_name: String,
    /// Proposed email address, raw form.
    pub email: String,
    /// Plaintext password, when (re)setting one.
    pub password: Option<String>,
    /// Role literal, one of the three known values.
    pub role: String,
    /// Date of birth; `None` when the field was missing.
    pub birth_date: Option<NaiveDate>,
    /// Active flag.
    pub active: bool,
}

/// Incoming payload for self-registration.
#[derive(Debug, Clone)]
pub struct RegisterDraft {
    /// Proposed display name.
    pub full_name: String,
    /// Proposed email address, raw form.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Password confirmation, must equal `password`.
    pub confirm_password: String,
    /// Date of birth; `None` when the field was missing.
    pub birth_date: Option<NaiveDate>,
}

fn full_name_rules() -> [Rule; 3] {
    [
        required("Full name is required."),
        length_between(2, 100, "Full name must be between 2 and 100 characters."),
        not_only_punctuation("Enter a valid name (not just punctuation)."),
    ]
}

fn email_rules() -> [Rule; 3] {
    [
        required("Email is required."),
        email_format("Invalid email format."),
        max_length(EMAIL_MAX, format!("Email must not exceed {EMAIL_MAX} characters.")),
    ]
}

fn password_rules() -> [Rule; 3] {
    [
        required("Password is required."),
        length_between(
            PASSWORD_MIN,
            PASSWORD_MAX,
            format!("Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters."),
        ),
        password_complexity(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             a digit and a special character.",
        ),
    ]
}

fn check_birth_date(report: &mut ValidationReport, birth_date: Option<NaiveDate>, today: NaiveDate) {
    match birth_date {
        None => report.add("birthDate", "Birth date is required."),
        Some(date) => {
            if is_future(date, today) {
                report.add("birthDate", "Birth date cannot be in the future.");
            }
            if !is_of_age(date, today) {
                report.add("birthDate", "You must be at least 18 years old.");
            }
        }
    }
}

/// Validate a user draft.
///
/// `password_required` distinguishes create (a password must be supplied)
/// from edit (an absent password keeps the stored hash). Uniqueness is
/// checked separately against the repository.
pub fn validate_user_draft(
    draft: &UserDraft,
    password_required: bool,
    today: NaiveDate,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.check("fullName", &draft.full_name, &full_name_rules());
    report.check("email", &draft.email, &email_rules());
    match &draft.password {
        Some(password) => report.check("password", password, &password_rules()),
        None if password_required => report.add("password", "Password is required."),
        None => {}
    }
    if draft.role.parse::<Role>().is_err() {
        report.add("role", "Role must be Administrator, Vendor or Client.");
    }
    check_birth_date(&mut report, draft.birth_date, today);
    report
}

/// Validate a self-registration draft.
pub fn validate_register_draft(draft: &RegisterDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.check("fullName", &draft.full_name, &full_name_rules());
    report.check("email", &draft.email, &email_rules());
    report.check("password", &draft.password, &password_rules());
    report.check(
        "confirmPassword",
        &draft.confirm_password,
        &[required("You must confirm your password.")],
    );
    if !draft.confirm_password.trim().is_empty() && draft.confirm_password != draft.password {
        report.add("confirmPassword", "The passwords do not match.");
    }
    check_birth_date(&mut report, draft.birth_date, today);
    report
}
