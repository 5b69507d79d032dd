//! Mock repository implementations for testing
//!
//! One mutex-guarded state backs every core port, so referential checks
//! (unknown distributor, distributor in use) behave like the real store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fflbro_core::quotes::numbering::parse_quote_number;
use fflbro_core::{DistributorRepository, ProductRepository, QuoteRepository, SyncProgressRepository};
use fflbro_domain::{
    Distributor, DistributorId, FflBroError, NewQuote, Product, ProductFields, ProductId, Quote,
    QuoteFilter, QuoteId, QuoteStatus, ReadinessState, Result as DomainResult, SearchCursor,
    SearchQuery, SyncProgress, SyncStatus,
};
use parking_lot::Mutex;

#[derive(Default)]
struct State {
    distributors: Vec<Distributor>,
    products: Vec<Product>,
    progress: BTreeMap<DistributorId, SyncProgress>,
    quotes: Vec<Quote>,
}

impl State {
    fn has_distributor(&self, id: &DistributorId) -> bool {
        self.distributors.iter().any(|d| &d.id == id)
    }
}

/// In-memory mock for all repository ports.
#[derive(Default, Clone)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
}

impl MockStore {
    pub fn product_count(&self) -> usize {
        self.state.lock().products.len()
    }

    pub fn quote_count(&self) -> usize {
        self.state.lock().quotes.len()
    }
}

impl DistributorRepository for MockStore {
    fn list_distributors(&self) -> DomainResult<Vec<Distributor>> {
        Ok(self.state.lock().distributors.clone())
    }

    fn find_distributor(&self, id: &DistributorId) -> DomainResult<Option<Distributor>> {
        Ok(self.state.lock().distributors.iter().find(|d| &d.id == id).cloned())
    }

    fn insert_distributor(&self, distributor: &Distributor) -> DomainResult<()> {
        let mut state = self.state.lock();
        if state.has_distributor(&distributor.id) {
            return Err(FflBroError::AlreadyExists(distributor.id.to_string()));
        }
        state.distributors.push(distributor.clone());
        Ok(())
    }

    fn update_status(&self, id: &DistributorId, status: ReadinessState) -> DomainResult<bool> {
        let mut state = self.state.lock();
        match state.distributors.iter_mut().find(|d| &d.id == id) {
            Some(distributor) => {
                distributor.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_distributor(&self, id: &DistributorId) -> DomainResult<()> {
        let mut state = self.state.lock();
        if !state.has_distributor(id) {
            return Err(FflBroError::UnknownDistributor(id.to_string()));
        }
        if state.products.iter().any(|p| &p.distributor_id == id) || state.progress.contains_key(id)
        {
            return Err(FflBroError::InUse(id.to_string()));
        }
        state.distributors.retain(|d| &d.id != id);
        Ok(())
    }
}

impl SyncProgressRepository for MockStore {
    fn find_progress(&self, distributor_id: &DistributorId) -> DomainResult<Option<SyncProgress>> {
        Ok(self.state.lock().progress.get(distributor_id).cloned())
    }

    fn list_progress(&self) -> DomainResult<Vec<SyncProgress>> {
        Ok(self.state.lock().progress.values().cloned().collect())
    }

    fn begin_run(
        &self,
        distributor_id: &DistributorId,
        expected_total: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<SyncProgress>> {
        let mut state = self.state.lock();
        if !state.has_distributor(distributor_id) {
            return Err(FflBroError::UnknownDistributor(distributor_id.to_string()));
        }
        let record = state
            .progress
            .entry(distributor_id.clone())
            .or_insert_with(|| SyncProgress::ready(distributor_id.clone()));
        if record.is_running() {
            return Ok(None);
        }
        record.status = SyncStatus::Running;
        record.total_items = expected_total;
        record.processed_items = 0;
        record.current_item = None;
        record.last_error = None;
        record.started_at = Some(now);
        record.finished_at = None;
        record.last_updated = Some(now);
        Ok(Some(record.clone()))
    }

    fn record_progress(
        &self,
        distributor_id: &DistributorId,
        delta: u64,
        current_item: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<SyncProgress>> {
        let mut state = self.state.lock();
        match state.progress.get_mut(distributor_id) {
            Some(record) if record.is_running() => {
                record.processed_items += delta;
                record.total_items = record.total_items.max(record.processed_items);
                record.current_item = Some(current_item.to_string());
                record.last_updated = Some(now);
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    fn finish_run(
        &self,
        distributor_id: &DistributorId,
        outcome: SyncStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<SyncProgress>> {
        let mut state = self.state.lock();
        match state.progress.get_mut(distributor_id) {
            Some(record) if record.is_running() => {
                record.status = outcome;
                record.last_error = error.map(str::to_string);
                record.finished_at = Some(now);
                record.last_updated = Some(now);
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }
}

impl ProductRepository for MockStore {
    fn upsert_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
        fields: &ProductFields,
        now: DateTime<Utc>,
    ) -> DomainResult<ProductId> {
        let mut state = self.state.lock();
        if !state.has_distributor(distributor_id) {
            return Err(FflBroError::UnknownDistributor(distributor_id.to_string()));
        }
        if let Some(existing) = state
            .products
            .iter_mut()
            .find(|p| &p.distributor_id == distributor_id && p.item_number == item_number)
        {
            existing.manufacturer = fields.manufacturer.clone();
            existing.description = fields.description.clone();
            existing.price = fields.price;
            existing.quantity = fields.quantity;
            existing.updated_at = now;
            return Ok(existing.id);
        }
        let id = ProductId::try_from(state.products.len()).unwrap() + 1;
        state.products.push(Product {
            id,
            distributor_id: distributor_id.clone(),
            item_number: item_number.to_string(),
            manufacturer: fields.manufacturer.clone(),
            description: fields.description.clone(),
            price: fields.price,
            quantity: fields.quantity,
            updated_at: now,
        });
        Ok(id)
    }

    fn find_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
    ) -> DomainResult<Option<Product>> {
        Ok(self
            .state
            .lock()
            .products
            .iter()
            .find(|p| &p.distributor_id == distributor_id && p.item_number == item_number)
            .cloned())
    }

    fn search_page(
        &self,
        query: &SearchQuery,
        after: Option<SearchCursor>,
        limit: usize,
    ) -> DomainResult<Vec<Product>> {
        let needle = query.needle();
        let mut keyed = Vec::new();
        for product in self.state.lock().products.iter().filter(|p| query.matches(p)) {
            let cursor = SearchCursor::for_product(&needle, product)?;
            if after.map_or(true, |after| cursor > after) {
                keyed.push((cursor, product.clone()));
            }
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().take(limit).map(|(_, product)| product).collect())
    }

    fn count_by_distributor(&self) -> DomainResult<BTreeMap<DistributorId, u64>> {
        let mut counts = BTreeMap::new();
        for product in &self.state.lock().products {
            *counts.entry(product.distributor_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn count_in_stock(&self) -> DomainResult<u64> {
        Ok(self.state.lock().products.iter().filter(|p| p.in_stock()).count() as u64)
    }

    fn sample(&self, distributor_id: &DistributorId, limit: usize) -> DomainResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .state
            .lock()
            .products
            .iter()
            .filter(|p| &p.distributor_id == distributor_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.item_number.cmp(&b.item_number));
        products.truncate(limit);
        Ok(products)
    }
}

impl QuoteRepository for MockStore {
    fn insert_quote(&self, quote: &NewQuote) -> DomainResult<Quote> {
        let mut state = self.state.lock();
        if state.quotes.iter().any(|q| q.quote_number == quote.quote_number) {
            return Err(FflBroError::AlreadyExists(quote.quote_number.clone()));
        }
        let id = QuoteId::try_from(state.quotes.len()).unwrap() + 1;
        let stored = Quote::from_new(id, quote.clone());
        state.quotes.push(stored.clone());
        Ok(stored)
    }

    fn find_by_number(&self, quote_number: &str) -> DomainResult<Option<Quote>> {
        Ok(self.state.lock().quotes.iter().find(|q| q.quote_number == quote_number).cloned())
    }

    fn update_status(
        &self,
        quote_number: &str,
        from: QuoteStatus,
        to: QuoteStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Quote>> {
        let mut state = self.state.lock();
        match state.quotes.iter_mut().find(|q| q.quote_number == quote_number) {
            Some(quote) if quote.status == from => {
                quote.status = to;
                quote.updated_at = now;
                Ok(Some(quote.clone()))
            }
            _ => Ok(None),
        }
    }

    fn expire_overdue(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut state = self.state.lock();
        let mut changed = 0;
        for quote in state.quotes.iter_mut() {
            if quote.status.expires_lazily() && quote.is_overdue(now) {
                quote.status = QuoteStatus::Expired;
                quote.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn list_page(
        &self,
        filter: &QuoteFilter,
        after: Option<QuoteId>,
        limit: usize,
    ) -> DomainResult<Vec<Quote>> {
        Ok(self
            .state
            .lock()
            .quotes
            .iter()
            .filter(|q| after.map_or(true, |after| q.id > after) && filter.matches(q))
            .take(limit)
            .cloned()
            .collect())
    }

    fn latest_sequence(&self, year: i32) -> DomainResult<u32> {
        Ok(self
            .state
            .lock()
            .quotes
            .iter()
            .filter_map(|q| parse_quote_number(&q.quote_number))
            .filter(|(y, _)| *y == year)
            .map(|(_, sequence)| sequence)
            .max()
            .unwrap_or(0))
    }
}
