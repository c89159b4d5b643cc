//! Villa API Library
//!
//! CRUD over villa records behind a small axum service. The library holds
//! the domain model, the HTTP layer and the storage backends; the binary
//! wires them together from environment configuration.

pub mod api;
pub mod domain;
pub mod infrastructure;
