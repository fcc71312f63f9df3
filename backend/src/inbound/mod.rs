//! Inbound adapters: everything that drives the domain from the outside.

pub mod http;
