//! Database implementations

mod columns;
pub mod distributor_repository;
pub mod manager;
pub mod product_repository;
pub mod quote_repository;
pub mod sync_progress_repository;

pub use distributor_repository::SqliteDistributorRepository;
pub use manager::DbManager;
pub use product_repository::SqliteProductRepository;
pub use quote_repository::SqliteQuoteRepository;
pub use sync_progress_repository::SqliteSyncProgressRepository;
