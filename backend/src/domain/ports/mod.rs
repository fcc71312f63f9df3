//! Port abstractions between the domain and its persistence adapters.
//!
//! Inbound adapters depend on these traits only, so handler tests can wire
//! deterministic in-memory implementations instead of a database.

mod customer_repository;
mod order_line_repository;
mod order_repository;
mod product_catalog;
mod user_repository;

pub use customer_repository::CustomerRepository;
pub use order_line_repository::OrderLineRepository;
pub use order_repository::OrderRepository;
pub use product_catalog::ProductCatalog;
pub use user_repository::UserRepository;

use super::error::Error;

/// Persistence errors raised by repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The repository connection could not be established.
    #[error("repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl PersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<PersistenceError> for Error {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Connection { message } => Self::service_unavailable(message),
            PersistenceError::Query { message } => Self::internal(message),
        }
    }
}
