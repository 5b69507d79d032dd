//! Port interfaces for the product catalog

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fflbro_domain::{DistributorId, Product, ProductFields, ProductId, Result, SearchCursor, SearchQuery};

/// Store of per-distributor product records
pub trait ProductRepository: Send + Sync {
    /// Create or overwrite the record keyed by `(distributor_id, item_number)`.
    ///
    /// The surrogate id of an existing record is preserved. Fails with
    /// `UnknownDistributor` when the distributor row does not exist.
    fn upsert_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
        fields: &ProductFields,
        now: DateTime<Utc>,
    ) -> Result<ProductId>;

    /// Product keyed by `(distributor_id, item_number)`, if stored.
    fn find_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
    ) -> Result<Option<Product>>;

    /// Up to `limit` matches strictly after `after` in
    /// `(rank, price_cents, product_id)` order.
    fn search_page(
        &self,
        query: &SearchQuery,
        after: Option<SearchCursor>,
        limit: usize,
    ) -> Result<Vec<Product>>;

    /// Product counts for every distributor that owns at least one product.
    fn count_by_distributor(&self) -> Result<BTreeMap<DistributorId, u64>>;

    /// Number of products with a positive quantity.
    fn count_in_stock(&self) -> Result<u64>;

    /// First `limit` products of a distributor ordered by item number.
    fn sample(&self, distributor_id: &DistributorId, limit: usize) -> Result<Vec<Product>>;
}
