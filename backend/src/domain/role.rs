//! Account roles and route-level allow-lists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role assigned to a user account, governing route-level authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Full access, including deletes.
    Administrator,
    /// May manage customers, orders and order lines, but not delete them.
    Vendor,
    /// Default role for self-registered accounts.
    Client,
}

/// Error returned when parsing an unknown role literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role must be Administrator, Vendor or Client")]
pub struct RoleParseError;

impl Role {
    /// All known roles, in privilege order.
    pub const ALL: [Self; 3] = [Self::Administrator, Self::Vendor, Self::Client];

    /// Stable string form used in storage and session claims.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Vendor => "Vendor",
            Self::Client => "Client",
        }
    }

    /// Whether this role appears in `allowed`.
    pub fn is_one_of(self, allowed: &[Self]) -> bool {
        allowed.contains(&self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Administrator" => Ok(Self::Administrator),
            "Vendor" => Ok(Self::Vendor),
            "Client" => Ok(Self::Client),
            _ => Err(RoleParseError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Administrator)]
    #[case(Role::Vendor)]
    #[case(Role::Client)]
    fn string_form_round_trips(#[case] role: Role) {
        let parsed: Role = role.as_str().parse().expect("known literal");
        assert_eq!(parsed, role);
    }

    #[rstest]
    #[case("administrator")]
    #[case("Admin")]
    #[case("")]
    fn unknown_literals_are_rejected(#[case] raw: &str) {
        assert!(raw.parse::<Role>().is_err());
    }

    #[test]
    fn allow_list_membership() {
        let manage = [Role::Administrator, Role::Vendor];
        assert!(Role::Vendor.is_one_of(&manage));
        assert!(!Role::Client.is_one_of(&manage));
    }
}
