//! Sync progress tracking and the catalog sync driver
pub mod job;
pub mod ports;
pub mod service;

pub use job::{CatalogSyncJob, DistributorFeed, FeedRecord, ResumePolicy, SyncOutcome};
pub use service::SyncTracker;
