//! Product catalog store
pub mod ports;
pub mod search;
pub mod service;

pub use search::ProductSearch;
pub use service::CatalogService;
