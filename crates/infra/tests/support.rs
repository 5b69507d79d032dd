//! Shared harness for `fflbro-infra` integration tests.
//!
//! Each [`TestLedger`] owns a temporary directory holding its SQLite file,
//! so tests run in isolation and can reopen the same database.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fflbro_common::time::MockClock;
use fflbro_domain::{Config, DistributorId, ProductFields};
use fflbro_infra::LedgerContext;
use rust_decimal::Decimal;
use tempfile::TempDir;

pub fn id(raw: &str) -> DistributorId {
    DistributorId::new(raw).expect("valid distributor id")
}

pub fn fields(manufacturer: &str, description: &str, cents: i64, quantity: u32) -> ProductFields {
    ProductFields::new(manufacturer, description, Decimal::new(cents, 2), quantity)
}

/// SQLite-backed ledger in a temporary directory with a controllable clock.
pub struct TestLedger {
    pub context: LedgerContext,
    pub clock: MockClock,
    pub config: Config,
    temp_dir: TempDir,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let mut config = Config::default();
        config.database.path = db_path(temp_dir.path()).to_string_lossy().into_owned();
        config.database.pool_size = 4;
        adjust(&mut config);

        let clock = MockClock::at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let context = LedgerContext::with_clock(&config, Arc::new(clock.clone()))
            .expect("ledger context should initialise");
        Self { context, clock, config, temp_dir }
    }

    /// A second context over the same database file and clock.
    pub fn reopen(&self) -> LedgerContext {
        LedgerContext::with_clock(&self.config, Arc::new(self.clock.clone()))
            .expect("ledger context should reopen")
    }

    pub fn db_path(&self) -> PathBuf {
        db_path(self.temp_dir.path())
    }
}

fn db_path(dir: &Path) -> PathBuf {
    dir.join("fflbro-integration.db")
}
