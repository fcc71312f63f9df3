//! Outbound adapters: infrastructure driven by the domain.

pub mod persistence;
