//! # FFL-BRO Domain
//!
//! Business domain types for the distributor inventory and quoting ledger.
//!
//! This crate contains:
//! - Distributor, product, sync-progress and quote models
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other FFL-BRO crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
