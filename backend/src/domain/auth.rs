//! Credential verification and session claims.
//!
//! Login checks run here against the user repository; the HTTP adapter only
//! maps the outcome onto responses and the cookie session. Session expiry is
//! embedded in the claims themselves: there is no server-side session store,
//! so a session is valid exactly while its `expires_at` lies in the future.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::ids::UserId;
use super::ports::{PersistenceError, UserRepository};
use super::role::Role;
use super::user::User;

/// Session lifetime for the given remember-me choice: seven days when set,
/// two hours otherwise.
pub fn session_ttl(remember_me: bool) -> Duration {
    if remember_me {
        Duration::days(7)
    } else {
        Duration::hours(2)
    }
}

/// Identity claims carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The authenticated account.
    pub user_id: UserId,
    /// Display name, for greeting without a lookup.
    pub full_name: String,
    /// Normalised email address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Hard expiry; the session is rejected from this instant on.
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Issue claims for a freshly authenticated user.
    pub fn issue(user: &User, remember_me: bool, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.as_str().to_owned(),
            role: user.role,
            expires_at: now + session_ttl(remember_me),
        }
    }

    /// Whether the claims have expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Why a login attempt was denied.
///
/// The three denial variants carry the user-facing message; the repository
/// variant wraps infrastructure failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// No account exists for the submitted email.
    #[error("This email is not registered.")]
    UnknownEmail,
    /// The account exists but its active flag is off.
    #[error("Your account is deactivated. Contact an administrator.")]
    Inactive,
    /// The password hash did not match.
    #[error("Incorrect password.")]
    BadCredentials,
    /// The user store could not be consulted.
    #[error(transparent)]
    Repository(#[from] PersistenceError),
}

/// Verifies credentials against the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    /// Create a service backed by the given user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Verify credentials and return the account on success.
    ///
    /// The account's active flag is checked before the password, matching
    /// the order in which denials are reported to the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let Ok(email) = Email::parse(email) else {
            // A malformed address cannot belong to any account.
            return Err(LoginError::UnknownEmail);
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(LoginError::UnknownEmail);
        };
        if !user.active {
            return Err(LoginError::Inactive);
        }
        if !user.password.verify(password) {
            return Err(LoginError::BadCredentials);
        }
        Ok(user)
    }
}
