//! Error types used throughout the ledger

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FFL-BRO
///
/// Every variant is a local, recoverable condition. Callers (admin pages, the
/// REST facade) match on the variant to pick a response; nothing here is fatal
/// to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FflBroError {
    #[error("Unknown distributor: {0}")]
    UnknownDistributor(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("In use: {0}")]
    InUse(String),

    #[error("Sync already running for distributor: {0}")]
    AlreadyRunning(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Quote requires at least one line item")]
    EmptyLineItems,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Gave up after {0} attempts")]
    ExhaustedRetries(u32),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, FflBroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = FflBroError::AlreadyRunning("rsr".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "AlreadyRunning");
        assert_eq!(json["message"], "rsr");
    }

    #[test]
    fn unit_variant_round_trips() {
        let json = serde_json::to_string(&FflBroError::EmptyLineItems).unwrap();
        let back: FflBroError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FflBroError::EmptyLineItems);
    }

    #[test]
    fn display_includes_context() {
        assert_eq!(
            FflBroError::ExhaustedRetries(5).to_string(),
            "Gave up after 5 attempts"
        );
        assert_eq!(
            FflBroError::UnknownDistributor("acme".into()).to_string(),
            "Unknown distributor: acme"
        );
    }
}
