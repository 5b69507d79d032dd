//! Lazy catalog search
//!
//! Pages are pulled from the repository on demand using keyset pagination
//! over `(rank, price_cents, product_id)`, so a search never materialises the
//! whole catalog and paging stays correct for a fixed snapshot.

use std::collections::VecDeque;
use std::sync::Arc;

use fflbro_domain::{Product, Result, SearchCursor, SearchQuery};

use super::ports::ProductRepository;

/// Finite, restartable iterator over search results
pub struct ProductSearch {
    repository: Arc<dyn ProductRepository>,
    query: SearchQuery,
    needle: String,
    page_size: usize,
    cursor: Option<SearchCursor>,
    buffer: VecDeque<Product>,
    yielded: usize,
    exhausted: bool,
}

impl ProductSearch {
    pub(crate) fn new(
        repository: Arc<dyn ProductRepository>,
        query: SearchQuery,
        page_size: usize,
    ) -> Self {
        let needle = query.needle();
        Self {
            repository,
            query,
            needle,
            page_size: page_size.max(1),
            cursor: None,
            buffer: VecDeque::new(),
            yielded: 0,
            exhausted: false,
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Rewind to the first result.
    pub fn restart(&mut self) {
        self.cursor = None;
        self.buffer.clear();
        self.yielded = 0;
        self.exhausted = false;
    }

    fn remaining(&self) -> Option<usize> {
        self.query.limit.map(|limit| limit.saturating_sub(self.yielded))
    }

    fn fetch_page(&mut self) -> Result<()> {
        let fetch = self.remaining().map_or(self.page_size, |left| left.min(self.page_size));
        let page = self.repository.search_page(&self.query, self.cursor, fetch)?;
        if page.len() < fetch {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.cursor = Some(SearchCursor::for_product(&self.needle, last)?);
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for ProductSearch {
    type Item = Result<Product>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == Some(0) {
            return None;
        }
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
        let product = self.buffer.pop_front()?;
        self.yielded += 1;
        Some(Ok(product))
    }
}
