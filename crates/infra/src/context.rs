//! Ledger context - dependency injection container
//!
//! Wires the four core services over one storage backend. Mock mode swaps
//! SQLite for [`MemoryStore`] at this boundary; services never see the
//! difference.

use std::sync::Arc;

use fflbro_common::time::{Clock, SystemClock};
use fflbro_core::{
    CatalogService, CatalogSyncJob, DistributorRegistry, DistributorRepository, ProductRepository,
    QuoteLedger, QuoteRepository, SequentialQuoteNumbers, SyncProgressRepository, SyncTracker,
};
use fflbro_domain::{Config, DistributorId, Result};
use tracing::{info, warn};

use crate::database::{
    DbManager, SqliteDistributorRepository, SqliteProductRepository, SqliteQuoteRepository,
    SqliteSyncProgressRepository,
};
use crate::memory::{fixture_catalog, MemoryStore};

/// Type alias for distributor repository port trait object
type DynDistributorRepository = dyn DistributorRepository + 'static;

/// Type alias for sync progress repository port trait object
type DynSyncProgressRepository = dyn SyncProgressRepository + 'static;

/// Type alias for product repository port trait object
type DynProductRepository = dyn ProductRepository + 'static;

/// Type alias for quote repository port trait object
type DynQuoteRepository = dyn QuoteRepository + 'static;

struct Ports {
    distributors: Arc<DynDistributorRepository>,
    progress: Arc<DynSyncProgressRepository>,
    products: Arc<DynProductRepository>,
    quotes: Arc<DynQuoteRepository>,
}

impl Ports {
    fn sqlite(db: &Arc<DbManager>) -> Self {
        Self {
            distributors: Arc::new(SqliteDistributorRepository::new(Arc::clone(db))),
            progress: Arc::new(SqliteSyncProgressRepository::new(Arc::clone(db))),
            products: Arc::new(SqliteProductRepository::new(Arc::clone(db))),
            quotes: Arc::new(SqliteQuoteRepository::new(Arc::clone(db))),
        }
    }

    fn memory(store: &MemoryStore) -> Self {
        Self {
            distributors: Arc::new(store.clone()),
            progress: Arc::new(store.clone()),
            products: Arc::new(store.clone()),
            quotes: Arc::new(store.clone()),
        }
    }
}

/// Ledger context - holds all services and dependencies
pub struct LedgerContext {
    pub config: Config,
    pub registry: Arc<DistributorRegistry>,
    pub tracker: Arc<SyncTracker>,
    pub catalog: Arc<CatalogService>,
    pub ledger: Arc<QuoteLedger>,
    db: Option<Arc<DbManager>>,
}

impl LedgerContext {
    /// Build the context described by `config`.
    ///
    /// SQLite mode opens the pool, runs migrations and seeds the registry.
    /// Mock mode also loads the fixture catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`LedgerContext::from_config`] with an explicit clock.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        if config.ledger.mock_mode {
            let context = Self::memory(config, clock)?;
            context.load_fixtures()?;
            return Ok(context);
        }

        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;
        db.health_check()?;
        let context = Self::assemble(config, Ports::sqlite(&db), clock, Some(db))?;
        info!(db_path = %config.database.path, "ledger context ready");
        Ok(context)
    }

    /// Empty in-memory context with the configured registry, regardless of
    /// `mock_mode`.
    pub fn in_memory(config: &Config) -> Result<Self> {
        Self::in_memory_with_clock(config, Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Self::memory(config, clock)
    }

    /// Sync driver over this context's tracker and catalog.
    pub fn sync_job(&self) -> CatalogSyncJob {
        CatalogSyncJob::new(Arc::clone(&self.tracker), Arc::clone(&self.catalog))
    }

    /// Database manager, `None` in memory mode.
    pub fn database(&self) -> Option<&Arc<DbManager>> {
        self.db.as_ref()
    }

    fn memory(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = MemoryStore::new();
        Self::assemble(config, Ports::memory(&store), clock, None)
    }

    fn assemble(
        config: &Config,
        ports: Ports,
        clock: Arc<dyn Clock>,
        db: Option<Arc<DbManager>>,
    ) -> Result<Self> {
        let registry = Arc::new(DistributorRegistry::new(Arc::clone(&ports.distributors)));
        let tracker = Arc::new(SyncTracker::new(
            Arc::clone(&ports.distributors),
            ports.progress,
            Arc::clone(&clock),
        ));
        let catalog = Arc::new(CatalogService::new(
            ports.distributors,
            ports.products,
            Arc::clone(&clock),
            &config.ledger,
        ));
        let numbers = Arc::new(SequentialQuoteNumbers::new(Arc::clone(&ports.quotes)));
        let ledger = Arc::new(QuoteLedger::new(ports.quotes, numbers, clock, &config.ledger));

        let seeded = registry.seed_from_config(&config.distributors)?;
        if seeded > 0 {
            info!(seeded, "distributors registered from configuration");
        }

        Ok(Self { config: config.clone(), registry, tracker, catalog, ledger, db })
    }

    /// Upsert fixture rows for every registered distributor.
    fn load_fixtures(&self) -> Result<()> {
        let mut loaded = 0;
        for fixture in fixture_catalog() {
            let distributor_id: DistributorId = fixture.distributor.parse()?;
            if !self.registry.is_known(&distributor_id)? {
                warn!(distributor_id = %distributor_id, "skipping fixture for unregistered distributor");
                continue;
            }
            self.catalog.upsert_product(&distributor_id, fixture.item_number, &fixture.fields)?;
            loaded += 1;
        }
        info!(loaded, "mock mode: fixture catalog loaded");
        Ok(())
    }
}
