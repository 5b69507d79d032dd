//! # FFL-BRO Core
//!
//! Business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for every store
//! - Services: distributor registry, sync tracker, catalog, quote ledger
//! - The catalog sync job driver
//!
//! ## Architecture Principles
//! - Only depends on `fflbro-domain` and `fflbro-common`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Services are synchronous; no background threads

pub mod catalog;
pub mod quotes;
pub mod registry;
pub mod sync;

pub use catalog::ports::ProductRepository;
pub use catalog::{CatalogService, ProductSearch};
pub use quotes::numbering::{QuoteNumberGenerator, SequentialQuoteNumbers};
pub use quotes::ports::QuoteRepository;
pub use quotes::{QuoteLedger, QuoteListing};
pub use registry::ports::DistributorRepository;
pub use registry::DistributorRegistry;
pub use sync::job::{CatalogSyncJob, DistributorFeed, FeedRecord, ResumePolicy, SyncOutcome};
pub use sync::ports::SyncProgressRepository;
pub use sync::SyncTracker;
