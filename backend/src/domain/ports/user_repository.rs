//! Port for user-account persistence.

use async_trait::async_trait;

use crate::domain::email::Email;
use crate::domain::ids::UserId;
use crate::domain::user::User;

use super::PersistenceError;

/// Persistence operations over user accounts.
///
/// Mutating operations report row presence so callers can distinguish a
/// successful write from one whose target vanished concurrently.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, newest registration first.
    async fn list(&self) -> Result<Vec<User>, PersistenceError>;

    /// Fetch a user by identifier.
    async fn find(&self, id: &UserId) -> Result<Option<User>, PersistenceError>;

    /// Fetch a user by normalised email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError>;

    /// Insert a new user.
    async fn insert(&self, user: &User) -> Result<(), PersistenceError>;

    /// Update an existing user.
    ///
    /// Returns `false` when no row matched the id (it vanished between read
    /// and write).
    async fn update(&self, user: &User) -> Result<bool, PersistenceError>;

    /// Delete a user. Returns `false` when no row matched; deleting an
    /// already-absent id is not an error.
    async fn delete(&self, id: &UserId) -> Result<bool, PersistenceError>;

    /// Whether `email` is already registered to a user other than `exclude`.
    async fn email_taken(
        &self,
        email: &Email,
        exclude: Option<&UserId>,
    ) -> Result<bool, PersistenceError>;
}
