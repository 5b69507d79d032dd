//! Distributor registry
pub mod ports;
pub mod service;

pub use service::DistributorRegistry;
