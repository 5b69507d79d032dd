//! Product catalog types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::distributor::DistributorId;
use super::money::to_cents;
use crate::errors::{FflBroError, Result};

/// Surrogate product key
pub type ProductId = i64;

/// Per-distributor product record
///
/// `(distributor_id, item_number)` is unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub distributor_id: DistributorId,
    pub item_number: String,
    pub manufacturer: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Mutable fields written by a sync run for one source record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
}

impl ProductFields {
    pub fn new(
        manufacturer: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self { manufacturer: manufacturer.into(), description: description.into(), price, quantity }
    }

    /// Reject negative prices, fractional cents and prices that do not fit
    /// the cents column.
    pub fn validate(&self) -> Result<()> {
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(FflBroError::InvalidPrice(format!("price must not be negative: {}", self.price)));
        }
        to_cents(self.price).map(|_| ())
    }
}

/// Optional narrowing applied to a catalog search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub distributor_id: Option<DistributorId>,
    pub in_stock_only: bool,
}

/// Catalog search request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub filters: SearchFilters,
    /// Cap on the total number of results, `None` for everything.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    pub fn distributor(mut self, id: DistributorId) -> Self {
        self.filters.distributor_id = Some(id);
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.filters.in_stock_only = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Trimmed, ASCII-lowercased needle used for matching.
    pub fn needle(&self) -> String {
        self.text.trim().to_ascii_lowercase()
    }

    /// Whether `product` satisfies the text match and filters.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(id) = &self.filters.distributor_id {
            if &product.distributor_id != id {
                return false;
            }
        }
        if self.filters.in_stock_only && !product.in_stock() {
            return false;
        }
        let needle = self.needle();
        needle.is_empty()
            || product.manufacturer.to_ascii_lowercase().contains(&needle)
            || product.description.to_ascii_lowercase().contains(&needle)
    }
}

/// Relevance rank of a product for `needle` (lower sorts first).
///
/// 0: empty needle or manufacturer equals the needle; 1: manufacturer or
/// description starts with it; 2: substring match elsewhere. `needle` must
/// already be trimmed and ASCII-lowercased.
pub fn relevance_rank(needle: &str, manufacturer: &str, description: &str) -> u8 {
    if needle.is_empty() {
        return 0;
    }
    let manufacturer = manufacturer.to_ascii_lowercase();
    if manufacturer == needle {
        return 0;
    }
    if manufacturer.starts_with(needle) || description.to_ascii_lowercase().starts_with(needle) {
        return 1;
    }
    2
}

/// Position of a product in the total search order
/// `(rank, price_cents, product_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchCursor {
    pub rank: u8,
    pub price_cents: i64,
    pub product_id: ProductId,
}

impl SearchCursor {
    pub fn for_product(needle: &str, product: &Product) -> Result<Self> {
        Ok(Self {
            rank: relevance_rank(needle, &product.manufacturer, &product.description),
            price_cents: to_cents(product.price)?,
            product_id: product.id,
        })
    }
}

/// Dashboard aggregate over the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_products: u64,
    pub in_stock_products: u64,
    pub by_distributor: BTreeMap<DistributorId, u64>,
}
