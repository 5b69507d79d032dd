//! Configuration structures
//!
//! Replaces the plugin's scattered option flags with one explicit struct that
//! is handed to each component at construction. Every section has defaults so
//! a partial TOML/JSON file is enough.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_DB_PATH,
    DEFAULT_DB_POOL_SIZE, DEFAULT_QUOTE_EXPIRY_DAYS, DEFAULT_QUOTE_NUMBER_ATTEMPTS,
    DEFAULT_SAMPLE_LIMIT_MAX, DEFAULT_SEARCH_PAGE_SIZE, MAX_QUOTE_EXPIRY_DAYS,
};
use crate::errors::{FflBroError, Result};
use crate::types::{DistributorId, ReadinessState};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
    pub distributors: Vec<DistributorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            ledger: LedgerConfig::default(),
            logging: LoggingConfig::default(),
            distributors: DistributorConfig::defaults(),
        }
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(FflBroError::Config("database.pool_size must be at least 1".into()));
        }
        self.ledger.validate()?;

        let mut seen = HashSet::new();
        for distributor in &self.distributors {
            if !seen.insert(distributor.id.as_str()) {
                return Err(FflBroError::Config(format!(
                    "duplicate distributor id in configuration: {}",
                    distributor.id
                )));
            }
        }
        Ok(())
    }
}

/// SQLite storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
    pub connection_timeout_secs: u64,
    pub enable_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_PATH.to_string(),
            pool_size: DEFAULT_DB_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            enable_wal: true,
        }
    }
}

/// Business settings shared by the catalog and quote services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Swap SQLite for seeded in-memory stores.
    pub mock_mode: bool,
    /// Flat tax rate applied to quote subtotals (0.0825 = 8.25%).
    pub tax_rate: Decimal,
    pub quote_expiry_days: u32,
    pub quote_number_attempts: u32,
    pub search_page_size: usize,
    pub sample_limit_max: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mock_mode: false,
            tax_rate: Decimal::ZERO,
            quote_expiry_days: DEFAULT_QUOTE_EXPIRY_DAYS,
            quote_number_attempts: DEFAULT_QUOTE_NUMBER_ATTEMPTS,
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
            sample_limit_max: DEFAULT_SAMPLE_LIMIT_MAX,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tax_rate.is_sign_negative() && !self.tax_rate.is_zero() {
            return Err(FflBroError::Config(format!(
                "ledger.tax_rate must not be negative: {}",
                self.tax_rate
            )));
        }
        if self.quote_expiry_days == 0 || self.quote_expiry_days > MAX_QUOTE_EXPIRY_DAYS {
            return Err(FflBroError::Config(format!(
                "ledger.quote_expiry_days must be between 1 and {MAX_QUOTE_EXPIRY_DAYS}: {}",
                self.quote_expiry_days
            )));
        }
        if self.quote_number_attempts == 0 {
            return Err(FflBroError::Config(
                "ledger.quote_number_attempts must be at least 1".into(),
            ));
        }
        if self.search_page_size == 0 {
            return Err(FflBroError::Config("ledger.search_page_size must be at least 1".into()));
        }
        if self.sample_limit_max == 0 {
            return Err(FflBroError::Config("ledger.sample_limit_max must be at least 1".into()));
        }
        Ok(())
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// Declarative registry entry loaded at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    pub id: DistributorId,
    pub name: String,
    #[serde(default)]
    pub status: ReadinessState,
}

impl DistributorConfig {
    /// Distributors known to a fresh installation.
    pub fn defaults() -> Vec<Self> {
        [
            ("lipseys", "Lipsey's", ReadinessState::Ready),
            ("rsr", "RSR Group", ReadinessState::Pending),
            ("davidsons", "Davidson's", ReadinessState::Pending),
            ("zanders", "Zanders", ReadinessState::Pending),
            ("sports_south", "Sports South", ReadinessState::Pending),
            ("orion", "Orion", ReadinessState::Pending),
        ]
        .into_iter()
        .filter_map(|(id, name, status)| {
            DistributorId::new(id).ok().map(|id| Self { id, name: name.to_string(), status })
        })
        .collect()
    }
}
