//! Product catalog service

use std::collections::BTreeMap;
use std::sync::Arc;

use fflbro_common::time::Clock;
use fflbro_domain::{
    CatalogStats, DistributorId, FflBroError, LedgerConfig, Product, ProductFields, ProductId,
    Result, SearchQuery,
};
use tracing::trace;

use super::ports::ProductRepository;
use super::search::ProductSearch;
use crate::registry::ports::DistributorRepository;

/// Catalog of distributor products
///
/// Ingestion is push-only: sync jobs call [`CatalogService::upsert_product`]
/// per source record; everything else is read-side.
pub struct CatalogService {
    distributors: Arc<dyn DistributorRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
    page_size: usize,
    sample_limit_max: usize,
}

impl CatalogService {
    /// Catalog over `products`, validating ids against `distributors`.
    pub fn new(
        distributors: Arc<dyn DistributorRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            distributors,
            products,
            clock,
            page_size: config.search_page_size.max(1),
            sample_limit_max: config.sample_limit_max.max(1),
        }
    }

    /// Create or overwrite one product; replaying the same input is a no-op
    /// apart from the timestamp.
    pub fn upsert_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
        fields: &ProductFields,
    ) -> Result<ProductId> {
        let item_number = item_number.trim();
        if item_number.is_empty() {
            return Err(FflBroError::InvalidInput("item number is required".into()));
        }
        fields.validate()?;
        self.ensure_known(distributor_id)?;

        let id = self.products.upsert_product(distributor_id, item_number, fields, self.clock.now())?;
        trace!(%distributor_id, item_number, product_id = id, "product upserted");
        Ok(id)
    }

    /// One product, `NotFound` when absent.
    pub fn get_product(&self, distributor_id: &DistributorId, item_number: &str) -> Result<Product> {
        self.ensure_known(distributor_id)?;
        self.products.find_product(distributor_id, item_number.trim())?.ok_or_else(|| {
            FflBroError::NotFound(format!("product {item_number} from {distributor_id}"))
        })
    }

    /// Lazy search ordered by relevance, then price, then id.
    ///
    /// A distributor filter naming an unregistered distributor fails up front.
    pub fn search(&self, query: SearchQuery) -> Result<ProductSearch> {
        if let Some(id) = &query.filters.distributor_id {
            self.ensure_known(id)?;
        }
        Ok(ProductSearch::new(Arc::clone(&self.products), query, self.page_size))
    }

    /// Counts for distributors that own at least one product.
    pub fn count_by_distributor(&self) -> Result<BTreeMap<DistributorId, u64>> {
        self.products.count_by_distributor()
    }

    /// Total, in-stock and per-distributor product counts.
    pub fn catalog_stats(&self) -> Result<CatalogStats> {
        let by_distributor = self.products.count_by_distributor()?;
        Ok(CatalogStats {
            total_products: by_distributor.values().sum(),
            in_stock_products: self.products.count_in_stock()?,
            by_distributor,
        })
    }

    /// First products of a distributor by item number; `limit` is clamped
    /// to the configured maximum.
    pub fn get_sample(&self, distributor_id: &DistributorId, limit: usize) -> Result<Vec<Product>> {
        self.ensure_known(distributor_id)?;
        self.products.sample(distributor_id, limit.min(self.sample_limit_max))
    }

    fn ensure_known(&self, distributor_id: &DistributorId) -> Result<()> {
        if self.distributors.find_distributor(distributor_id)?.is_none() {
            return Err(FflBroError::UnknownDistributor(distributor_id.to_string()));
        }
        Ok(())
    }
}
