//! Distributor feed connectors
//!
//! Feeds implement [`fflbro_core::DistributorFeed`] and are driven by
//! [`fflbro_core::CatalogSyncJob`]. Fetching the file (FTP, HTTP, drop
//! folder) happens before a feed is constructed.

pub mod csv;

pub use self::csv::CsvFeed;
