//! Domain types and models

pub mod distributor;
pub mod money;
pub mod product;
pub mod quote;
pub mod sync;

pub use distributor::{Distributor, DistributorId, ReadinessState};
pub use money::{from_cents, is_whole_cents, round_money, to_cents};
pub use product::{
    relevance_rank, CatalogStats, Product, ProductFields, ProductId, SearchCursor, SearchFilters,
    SearchQuery,
};
pub use quote::{
    CustomerInfo, LineItem, NewQuote, Quote, QuoteFilter, QuoteId, QuoteStatus, QuoteTotals,
};
pub use sync::{SyncProgress, SyncStatus};
