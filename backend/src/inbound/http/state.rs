//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend on
//! domain ports only and remain testable without I/O.

use std::sync::Arc;

use crate::domain::AuthService;
use crate::domain::ports::{
    CustomerRepository, OrderLineRepository, OrderRepository, ProductCatalog, UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential verification over the user store.
    pub auth: AuthService,
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Customer records.
    pub customers: Arc<dyn CustomerRepository>,
    /// Orders.
    pub orders: Arc<dyn OrderRepository>,
    /// Order line-items.
    pub order_lines: Arc<dyn OrderLineRepository>,
    /// Read-only product catalog.
    pub products: Arc<dyn ProductCatalog>,
}

impl HttpState {
    /// Bundle the port implementations; the auth service shares the user
    /// repository.
    pub fn new(
        users: Arc<dyn UserRepository>,
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        order_lines: Arc<dyn OrderLineRepository>,
        products: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone()),
            users,
            customers,
            orders,
            order_lines,
            products,
        }
    }
}
