//! Email addresses, normalised for case-insensitive comparison.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum accepted length for an email address.
pub const EMAIL_MAX: usize = 160;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not our concern.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Whether `raw` matches the accepted `local@domain.tld` shape.
pub fn looks_like_email(raw: &str) -> bool {
    email_regex().is_match(raw)
}

/// Validation errors returned by [`Email::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailParseError {
    /// The input was empty after trimming.
    #[error("email must not be empty")]
    Empty,
    /// The input exceeds [`EMAIL_MAX`] characters.
    #[error("email must be at most {EMAIL_MAX} characters")]
    TooLong,
    /// The input does not look like an email address.
    #[error("email format is invalid")]
    InvalidFormat,
}

/// A validated email address.
///
/// ## Invariants
/// - Stored lowercased, so equality and persistence lookups are
///   case-insensitive by construction.
/// - Matches a `local@domain.tld` shape and fits within [`EMAIL_MAX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn parse(raw: &str) -> Result<Self, EmailParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailParseError::Empty);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(EmailParseError::TooLong);
        }
        if !looks_like_email(trimmed) {
            return Err(EmailParseError::InvalidFormat);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// The normalised (lowercase) address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com")]
    #[case("  padded@example.com  ")]
    #[case("dot.ted+tag@sub.example.org")]
    fn accepts_plausible_addresses(#[case] raw: &str) {
        assert!(Email::parse(raw).is_ok());
    }

    #[rstest]
    #[case("", EmailParseError::Empty)]
    #[case("   ", EmailParseError::Empty)]
    #[case("no-at-sign.example.com", EmailParseError::InvalidFormat)]
    #[case("two@@example.com", EmailParseError::InvalidFormat)]
    #[case("spaces in@example.com", EmailParseError::InvalidFormat)]
    #[case("missing-tld@example", EmailParseError::InvalidFormat)]
    fn rejects_malformed_addresses(#[case] raw: &str, #[case] expected: EmailParseError) {
        assert_eq!(Email::parse(raw), Err(expected));
    }

    #[test]
    fn rejects_overlong_addresses() {
        let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        assert_eq!(Email::parse(&raw), Err(EmailParseError::TooLong));
    }

    #[test]
    fn normalises_to_lowercase() {
        let email = Email::parse("Ada@Example.COM").expect("valid address");
        assert_eq!(email.as_str(), "ada@example.com");
        assert_eq!(email, Email::parse("ADA@example.com").expect("valid address"));
    }
}
