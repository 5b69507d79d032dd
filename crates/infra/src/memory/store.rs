//! Mutex-guarded state behind every repository port
//!
//! Queries mirror the SQL ordering and filters of the database adapters.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fflbro_core::quotes::numbering::parse_quote_number;
use fflbro_core::{DistributorRepository, ProductRepository, QuoteRepository, SyncProgressRepository};
use fflbro_domain::{
    Distributor, DistributorId, FflBroError, NewQuote, Product, ProductFields, ProductId, Quote,
    QuoteFilter, QuoteId, QuoteStatus, ReadinessState, Result, SearchCursor, SearchQuery,
    SyncProgress, SyncStatus,
};
use parking_lot::Mutex;

#[derive(Default)]
struct MemoryState {
    distributors: Vec<Distributor>,
    products: BTreeMap<ProductId, Product>,
    progress: BTreeMap<DistributorId, SyncProgress>,
    quotes: BTreeMap<QuoteId, Quote>,
    next_product_id: ProductId,
    next_quote_id: QuoteId,
}

impl MemoryState {
    fn require_distributor(&self, id: &DistributorId) -> Result<()> {
        if self.distributors.iter().any(|d| &d.id == id) {
            Ok(())
        } else {
            Err(FflBroError::UnknownDistributor(id.to_string()))
        }
    }

    fn running_progress(&mut self, id: &DistributorId) -> Option<&mut SyncProgress> {
        self.progress.get_mut(id).filter(|record| record.is_running())
    }
}

/// Shared in-memory store; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DistributorRepository for MemoryStore {
    fn list_distributors(&self) -> Result<Vec<Distributor>> {
        Ok(self.state.lock().distributors.clone())
    }

    fn find_distributor(&self, id: &DistributorId) -> Result<Option<Distributor>> {
        Ok(self.state.lock().distributors.iter().find(|d| &d.id == id).cloned())
    }

    fn insert_distributor(&self, distributor: &Distributor) -> Result<()> {
        let mut state = self.state.lock();
        if state.require_distributor(&distributor.id).is_ok() {
            return Err(FflBroError::AlreadyExists(format!("distributor {}", distributor.id)));
        }
        state.distributors.push(distributor.clone());
        Ok(())
    }

    fn update_status(&self, id: &DistributorId, status: ReadinessState) -> Result<bool> {
        let mut state = self.state.lock();
        Ok(state
            .distributors
            .iter_mut()
            .find(|d| &d.id == id)
            .map(|distributor| distributor.status = status)
            .is_some())
    }

    fn delete_distributor(&self, id: &DistributorId) -> Result<()> {
        let mut state = self.state.lock();
        state.require_distributor(id)?;
        let referenced = state.progress.contains_key(id)
            || state.products.values().any(|p| &p.distributor_id == id);
        if referenced {
            return Err(FflBroError::InUse(format!(
                "distributor {id} still has products or sync history"
            )));
        }
        state.distributors.retain(|d| &d.id != id);
        Ok(())
    }
}

impl SyncProgressRepository for MemoryStore {
    fn find_progress(&self, distributor_id: &DistributorId) -> Result<Option<SyncProgress>> {
        Ok(self.state.lock().progress.get(distributor_id).cloned())
    }

    fn list_progress(&self) -> Result<Vec<SyncProgress>> {
        Ok(self.state.lock().progress.values().cloned().collect())
    }

    fn begin_run(
        &self,
        distributor_id: &DistributorId,
        expected_total: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>> {
        let mut state = self.state.lock();
        state.require_distributor(distributor_id)?;
        if state.running_progress(distributor_id).is_some() {
            return Ok(None);
        }
        let record = SyncProgress {
            status: SyncStatus::Running,
            total_items: expected_total,
            started_at: Some(now),
            last_updated: Some(now),
            ..SyncProgress::ready(distributor_id.clone())
        };
        state.progress.insert(distributor_id.clone(), record.clone());
        Ok(Some(record))
    }

    fn record_progress(
        &self,
        distributor_id: &DistributorId,
        delta: u64,
        current_item: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>> {
        let mut state = self.state.lock();
        Ok(state.running_progress(distributor_id).map(|record| {
            record.processed_items = record.processed_items.saturating_add(delta);
            record.total_items = record.total_items.max(record.processed_items);
            record.current_item = Some(current_item.to_string());
            record.last_updated = Some(now);
            record.clone()
        }))
    }

    fn finish_run(
        &self,
        distributor_id: &DistributorId,
        outcome: SyncStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>> {
        let mut state = self.state.lock();
        Ok(state.running_progress(distributor_id).map(|record| {
            record.status = outcome;
            record.last_error = error.map(str::to_string);
            record.finished_at = Some(now);
            record.last_updated = Some(now);
            record.clone()
        }))
    }
}

impl ProductRepository for MemoryStore {
    fn upsert_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
        fields: &ProductFields,
        now: DateTime<Utc>,
    ) -> Result<ProductId> {
        let mut state = self.state.lock();
        state.require_distributor(distributor_id)?;

        let existing = state
            .products
            .values_mut()
            .find(|p| &p.distributor_id == distributor_id && p.item_number == item_number);
        if let Some(product) = existing {
            product.manufacturer.clone_from(&fields.manufacturer);
            product.description.clone_from(&fields.description);
            product.price = fields.price;
            product.quantity = fields.quantity;
            product.updated_at = now;
            return Ok(product.id);
        }

        state.next_product_id += 1;
        let id = state.next_product_id;
        state.products.insert(
            id,
            Product {
                id,
                distributor_id: distributor_id.clone(),
                item_number: item_number.to_string(),
                manufacturer: fields.manufacturer.clone(),
                description: fields.description.clone(),
                price: fields.price,
                quantity: fields.quantity,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn find_product(&self, distributor_id: &DistributorId, item_number: &str) -> Result<Option<Product>> {
        Ok(self
            .state
            .lock()
            .products
            .values()
            .find(|p| &p.distributor_id == distributor_id && p.item_number == item_number)
            .cloned())
    }

    fn search_page(
        &self,
        query: &SearchQuery,
        after: Option<SearchCursor>,
        limit: usize,
    ) -> Result<Vec<Product>> {
        let needle = query.needle();
        let state = self.state.lock();
        let mut keyed = Vec::new();
        for product in state.products.values().filter(|p| query.matches(p)) {
            let key = SearchCursor::for_product(&needle, product)?;
            if after.map_or(true, |after| key > after) {
                keyed.push((key, product));
            }
        }
        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().take(limit).map(|(_, product)| product.clone()).collect())
    }

    fn count_by_distributor(&self) -> Result<BTreeMap<DistributorId, u64>> {
        let mut counts = BTreeMap::new();
        for product in self.state.lock().products.values() {
            *counts.entry(product.distributor_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn count_in_stock(&self) -> Result<u64> {
        Ok(self.state.lock().products.values().filter(|p| p.in_stock()).count() as u64)
    }

    fn sample(&self, distributor_id: &DistributorId, limit: usize) -> Result<Vec<Product>> {
        let state = self.state.lock();
        let mut products: Vec<&Product> =
            state.products.values().filter(|p| &p.distributor_id == distributor_id).collect();
        products.sort_by(|a, b| a.item_number.cmp(&b.item_number));
        Ok(products.into_iter().take(limit).cloned().collect())
    }
}

impl QuoteRepository for MemoryStore {
    fn insert_quote(&self, quote: &NewQuote) -> Result<Quote> {
        let mut state = self.state.lock();
        if state.quotes.values().any(|q| q.quote_number == quote.quote_number) {
            return Err(FflBroError::AlreadyExists(format!("quote {}", quote.quote_number)));
        }
        state.next_quote_id += 1;
        let stored = Quote::from_new(state.next_quote_id, quote.clone());
        state.quotes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_by_number(&self, quote_number: &str) -> Result<Option<Quote>> {
        Ok(self.state.lock().quotes.values().find(|q| q.quote_number == quote_number).cloned())
    }

    fn update_status(
        &self,
        quote_number: &str,
        from: QuoteStatus,
        to: QuoteStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Quote>> {
        let mut state = self.state.lock();
        Ok(state
            .quotes
            .values_mut()
            .find(|q| q.quote_number == quote_number && q.status == from)
            .map(|quote| {
                quote.status = to;
                quote.updated_at = now;
                quote.clone()
            }))
    }

    fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut state = self.state.lock();
        let mut expired = 0;
        for quote in state.quotes.values_mut() {
            if quote.status.expires_lazily() && quote.is_overdue(now) {
                quote.status = QuoteStatus::Expired;
                quote.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    fn list_page(&self, filter: &QuoteFilter, after: Option<QuoteId>, limit: usize) -> Result<Vec<Quote>> {
        let state = self.state.lock();
        let start = after.map_or(0, |id| id.saturating_add(1));
        Ok(state
            .quotes
            .range(start..)
            .map(|(_, quote)| quote)
            .filter(|quote| filter.matches(quote))
            .take(limit)
            .cloned()
            .collect())
    }

    fn latest_sequence(&self, year: i32) -> Result<u32> {
        Ok(self
            .state
            .lock()
            .quotes
            .values()
            .filter_map(|q| parse_quote_number(&q.quote_number))
            .filter(|(quote_year, _)| *quote_year == year)
            .map(|(_, sequence)| sequence)
            .max()
            .unwrap_or(0))
    }
}
