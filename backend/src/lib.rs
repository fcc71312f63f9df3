//! Back-office service for a small crafts-sales business.
//!
//! Layout follows ports-and-adapters: `domain` holds entities, validation
//! and ports; `inbound::http` adapts Actix requests onto the domain;
//! `outbound::persistence` implements the ports over PostgreSQL via Diesel;
//! `server` assembles the application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
