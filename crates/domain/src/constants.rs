//! Ledger constants
//!
//! Centralized location for domain-level defaults used throughout the
//! workspace.

// Quote defaults
pub const DEFAULT_QUOTE_EXPIRY_DAYS: u32 = 30;
pub const MAX_QUOTE_EXPIRY_DAYS: u32 = 3650;
pub const DEFAULT_QUOTE_NUMBER_ATTEMPTS: u32 = 5;
pub const QUOTE_NUMBER_PREFIX: &str = "Q";
pub const QUOTE_SEQUENCE_WIDTH: usize = 5;

// Catalog defaults
pub const DEFAULT_SEARCH_PAGE_SIZE: usize = 50;
pub const DEFAULT_SAMPLE_LIMIT_MAX: usize = 100;

// Sync defaults
pub const SYNC_CANCELLED_REASON: &str = "cancelled";
pub const DEFAULT_PROGRESS_REPORT_EVERY: u64 = 100;

// Distributor identifiers
pub const MAX_DISTRIBUTOR_ID_LENGTH: usize = 64;

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "fflbro.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 5;
