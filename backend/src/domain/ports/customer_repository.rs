//! Port for customer persistence.

use async_trait::async_trait;

use crate::domain::customer::Customer;
use crate::domain::email::Email;
use crate::domain::ids::CustomerId;

use super::PersistenceError;

/// Persistence operations over customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Customers ordered by name. When `filter` is given, keep only rows
    /// whose name, email, address or phone contains it, case-insensitively.
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Customer>, PersistenceError>;

    /// Fetch a customer by identifier.
    async fn find(&self, id: &CustomerId) -> Result<Option<Customer>, PersistenceError>;

    /// Insert a new customer.
    async fn insert(&self, customer: &Customer) -> Result<(), PersistenceError>;

    /// Update an existing customer. Returns `false` when the row vanished.
    async fn update(&self, customer: &Customer) -> Result<bool, PersistenceError>;

    /// Delete a customer. Returns `false` when no row matched.
    async fn delete(&self, id: &CustomerId) -> Result<bool, PersistenceError>;

    /// Whether `email` already belongs to a customer other than `exclude`.
    async fn email_taken(
        &self,
        email: &Email,
        exclude: Option<&CustomerId>,
    ) -> Result<bool, PersistenceError>;
}
