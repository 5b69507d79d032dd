//! Shared test helpers for `fflbro-core` integration tests.
//!
//! A single in-memory store implements every port so services can be wired
//! exactly as in production, with a controllable clock.

#![allow(dead_code)]

pub mod repositories;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fflbro_common::time::MockClock;
use fflbro_core::{
    CatalogService, DistributorRegistry, QuoteLedger, QuoteNumberGenerator, SequentialQuoteNumbers,
    SyncTracker,
};
use fflbro_domain::{DistributorId, LedgerConfig, ProductFields, ReadinessState};
use rust_decimal::Decimal;

pub use repositories::MockStore;

pub fn id(raw: &str) -> DistributorId {
    DistributorId::new(raw).unwrap()
}

pub fn glock_19() -> ProductFields {
    ProductFields::new("Glock", "G19 Gen5 9mm pistol", Decimal::new(43890, 2), 15)
}

/// Services over one shared [`MockStore`].
pub struct Harness {
    pub store: MockStore,
    pub clock: MockClock,
    pub config: LedgerConfig,
    pub registry: DistributorRegistry,
    pub tracker: Arc<SyncTracker>,
    pub catalog: Arc<CatalogService>,
    pub ledger: QuoteLedger,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let store = MockStore::default();
        let numbers: Arc<dyn QuoteNumberGenerator> =
            Arc::new(SequentialQuoteNumbers::new(Arc::new(store.clone())));
        Self::with_numbers(store, numbers, config)
    }

    pub fn with_numbers(
        store: MockStore,
        numbers: Arc<dyn QuoteNumberGenerator>,
        config: LedgerConfig,
    ) -> Self {
        let clock = MockClock::at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let shared = Arc::new(store.clone());
        let registry = DistributorRegistry::new(shared.clone());
        let tracker = Arc::new(SyncTracker::new(shared.clone(), shared.clone(), Arc::new(clock.clone())));
        let catalog = Arc::new(CatalogService::new(
            shared.clone(),
            shared.clone(),
            Arc::new(clock.clone()),
            &config,
        ));
        let ledger = QuoteLedger::new(shared, numbers, Arc::new(clock.clone()), &config);
        Self { store, clock, config, registry, tracker, catalog, ledger }
    }

    /// Register a distributor in the `ready` state.
    pub fn register(&self, raw: &str) -> DistributorId {
        let distributor_id = id(raw);
        self.registry.add_distributor(distributor_id.clone(), raw.to_uppercase(), ReadinessState::Ready).unwrap();
        distributor_id
    }
}
