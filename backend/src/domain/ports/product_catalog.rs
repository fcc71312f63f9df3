//! Read-only port over the product catalog.
//!
//! Products are managed by another system; this service only needs them for
//! line-item selection.

use async_trait::async_trait;

use crate::domain::order::Product;

use super::PersistenceError;

/// Read access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All products, ordered by name.
    async fn list(&self) -> Result<Vec<Product>, PersistenceError>;
}
