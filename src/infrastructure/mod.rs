//! Infrastructure module for persistence.
//!
//! This module contains the villa record store contract, its backends, and
//! the factory that picks one from configuration.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, Repositories, RepositoryConfig, RepositoryFactory,
    StorageMode,
};
pub use in_memory::InMemoryVillaRepository;
pub use postgres::PostgresVillaRepository;
pub use repository::{RepositoryError, RepositoryResult, VillaRepository};
