//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! Principles:
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; no business logic lives here.
//! - **Internal models**: row structs (`models`) and table definitions
//!   (`schema`) never leave this module.
//! - **Row-presence concurrency**: updates and deletes report whether a row
//!   was touched, so callers can surface vanished rows as not-found.
//! - **Typed errors**: all failures map onto the domain persistence error.

mod diesel_customer_repository;
mod diesel_error;
mod diesel_order_line_repository;
mod diesel_order_repository;
mod diesel_product_catalog;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_customer_repository::DieselCustomerRepository;
pub use diesel_order_line_repository::DieselOrderLineRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_catalog::DieselProductCatalog;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolError};
