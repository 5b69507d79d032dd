//! Port interfaces for quote persistence

use chrono::{DateTime, Utc};
use fflbro_domain::{NewQuote, Quote, QuoteFilter, QuoteId, QuoteStatus, Result};

/// Append-mostly store of quotes; rows are never deleted
pub trait QuoteRepository: Send + Sync {
    /// Persist a new quote. A taken `quote_number` fails with
    /// `AlreadyExists` so the caller can regenerate.
    fn insert_quote(&self, quote: &NewQuote) -> Result<Quote>;

    /// Quote stored under `quote_number`, if any.
    fn find_by_number(&self, quote_number: &str) -> Result<Option<Quote>>;

    /// Set `to` only if the stored status is still `from`.
    ///
    /// Returns `None` when the quote is missing or its status moved on.
    fn update_status(
        &self,
        quote_number: &str,
        from: QuoteStatus,
        to: QuoteStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Quote>>;

    /// Persist `expired` on every pending or sent quote whose expiry is
    /// before `now`. Returns the number of quotes changed.
    fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Up to `limit` quotes matching `filter` with id greater than `after`,
    /// ordered by id.
    fn list_page(
        &self,
        filter: &QuoteFilter,
        after: Option<QuoteId>,
        limit: usize,
    ) -> Result<Vec<Quote>>;

    /// Highest sequence issued for `year`, 0 when none.
    fn latest_sequence(&self, year: i32) -> Result<u32>;
}
