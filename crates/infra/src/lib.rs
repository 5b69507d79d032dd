//! # FFL-BRO Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories, schema and migrations
//! - In-memory adapters and fixture data for mock mode
//! - Configuration loading and tracing setup
//! - Distributor feed connectors (CSV)
//! - The [`LedgerContext`] wiring everything together
//!
//! ## Architecture
//! - Implements traits defined in `fflbro-core`
//! - Depends on `fflbro-common` and `fflbro-domain`
//! - Contains all "impure" code (database, filesystem, environment)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod feeds;
pub mod memory;
pub mod observability;

// Re-export commonly used items
pub use context::LedgerContext;
pub use database::*;
pub use errors::InfraError;
pub use feeds::CsvFeed;
pub use memory::MemoryStore;
pub use observability::init_tracing;
