//! Port for order persistence.

use async_trait::async_trait;

use crate::domain::ids::OrderId;
use crate::domain::order::Order;

use super::PersistenceError;

/// Persistence operations over orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// All orders, most recent order date first.
    async fn list(&self) -> Result<Vec<Order>, PersistenceError>;

    /// Fetch an order by identifier.
    async fn find(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError>;

    /// Insert a new order.
    async fn insert(&self, order: &Order) -> Result<(), PersistenceError>;

    /// Update an existing order. Returns `false` when the row vanished.
    async fn update(&self, order: &Order) -> Result<bool, PersistenceError>;

    /// Delete an order. Returns `false` when no row matched.
    async fn delete(&self, id: &OrderId) -> Result<bool, PersistenceError>;
}
