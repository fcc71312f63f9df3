//! Port for order line-item persistence.

use async_trait::async_trait;

use crate::domain::ids::{OrderId, OrderLineId};
use crate::domain::order::OrderLine;

use super::PersistenceError;

/// Persistence operations over order line-items.
#[async_trait]
pub trait OrderLineRepository: Send + Sync {
    /// All order lines.
    async fn list(&self) -> Result<Vec<OrderLine>, PersistenceError>;

    /// The lines belonging to one order.
    async fn list_for_order(&self, order: &OrderId) -> Result<Vec<OrderLine>, PersistenceError>;

    /// Fetch a line by identifier.
    async fn find(&self, id: &OrderLineId) -> Result<Option<OrderLine>, PersistenceError>;

    /// Insert a new line.
    async fn insert(&self, line: &OrderLine) -> Result<(), PersistenceError>;

    /// Update an existing line. Returns `false` when the row vanished.
    async fn update(&self, line: &OrderLine) -> Result<bool, PersistenceError>;

    /// Delete a line. Returns `false` when no row matched.
    async fn delete(&self, id: &OrderLineId) -> Result<bool, PersistenceError>;
}
