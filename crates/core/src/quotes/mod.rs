//! Quote ledger
pub mod numbering;
pub mod ports;
pub mod service;

pub use service::{QuoteLedger, QuoteListing};
