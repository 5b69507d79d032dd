//! Quote ledger service
//!
//! Quotes are priced once at creation and only change status afterwards.
//! Expiry is lazy: overdue `pending`/`sent` quotes are persisted as
//! `expired` whenever they are read, there is no background timer.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fflbro_common::time::Clock;
use fflbro_domain::{
    CustomerInfo, FflBroError, LedgerConfig, LineItem, NewQuote, Quote, QuoteFilter, QuoteId,
    QuoteStatus, QuoteTotals, Result,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::numbering::QuoteNumberGenerator;
use super::ports::QuoteRepository;

/// Quote ledger
pub struct QuoteLedger {
    quotes: Arc<dyn QuoteRepository>,
    numbers: Arc<dyn QuoteNumberGenerator>,
    clock: Arc<dyn Clock>,
    tax_rate: Decimal,
    expiry: Duration,
    max_attempts: u32,
    page_size: usize,
}

impl QuoteLedger {
    /// Ledger over `quotes` using `config` for tax, expiry and retries.
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        numbers: Arc<dyn QuoteNumberGenerator>,
        clock: Arc<dyn Clock>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            quotes,
            numbers,
            clock,
            tax_rate: config.tax_rate,
            expiry: Duration::days(i64::from(config.quote_expiry_days)),
            max_attempts: config.quote_number_attempts.max(1),
            page_size: config.search_page_size.max(1),
        }
    }

    /// Price `line_items` and store a new `pending` quote under a fresh number.
    ///
    /// A number taken by a concurrent creator is regenerated; after the
    /// configured number of attempts this fails with `ExhaustedRetries`.
    pub fn create_quote(&self, customer: CustomerInfo, line_items: Vec<LineItem>) -> Result<Quote> {
        let totals = QuoteTotals::compute(&line_items, self.tax_rate)?;
        let customer = normalize_customer(customer)?;
        let created_at = self.clock.now();
        let expires_at = created_at.checked_add_signed(self.expiry).ok_or_else(|| {
            FflBroError::Config(format!("quote expiry of {} days is out of range", self.expiry.num_days()))
        })?;

        let mut new_quote = NewQuote {
            quote_number: String::new(),
            customer,
            line_items,
            totals,
            tax_rate: self.tax_rate,
            status: QuoteStatus::Pending,
            created_at,
            expires_at,
        };

        for attempt in 1..=self.max_attempts {
            new_quote.quote_number = self.numbers.next_number(created_at)?;
            match self.quotes.insert_quote(&new_quote) {
                Ok(quote) => {
                    info!(
                        quote_number = %quote.quote_number,
                        total = %quote.total,
                        lines = quote.line_items.len(),
                        "quote created"
                    );
                    return Ok(quote);
                }
                Err(FflBroError::AlreadyExists(_)) => {
                    warn!(
                        quote_number = %new_quote.quote_number,
                        attempt,
                        "quote number collision; regenerating"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(FflBroError::ExhaustedRetries(self.max_attempts))
    }

    /// Load a quote, persisting `expired` first when it is overdue.
    pub fn get_quote(&self, quote_number: &str) -> Result<Quote> {
        let quote = self.load(quote_number)?;
        self.expire_if_overdue(quote, self.clock.now())
    }

    /// Apply a status transition.
    ///
    /// Legal moves: `pending -> sent | rejected`, `sent -> approved |
    /// rejected | expired`, and anything not yet expired `-> expired` once
    /// overdue. An overdue `pending`/`sent` quote expires first, so only
    /// `-> expired` is then accepted.
    pub fn transition_status(&self, quote_number: &str, new_status: QuoteStatus) -> Result<Quote> {
        let now = self.clock.now();
        let quote = self.load(quote_number)?;
        let overdue = quote.is_overdue(now);

        if overdue && quote.status.expires_lazily() {
            let expired = self.expire_if_overdue(quote, now)?;
            if new_status == QuoteStatus::Expired && expired.status == QuoteStatus::Expired {
                return Ok(expired);
            }
            return Err(FflBroError::InvalidTransition(format!(
                "quote {quote_number} expired at {}; cannot move to {new_status}",
                expired.expires_at
            )));
        }

        if !quote.status.can_transition_to(new_status, overdue) {
            return Err(FflBroError::InvalidTransition(format!(
                "quote {quote_number}: {} -> {new_status} is not allowed",
                quote.status
            )));
        }

        match self.quotes.update_status(quote_number, quote.status, new_status, now)? {
            Some(updated) => {
                info!(quote_number, from = %quote.status, to = %new_status, "quote status changed");
                Ok(updated)
            }
            None => Err(FflBroError::InvalidTransition(format!(
                "quote {quote_number} changed concurrently; {} is no longer current",
                quote.status
            ))),
        }
    }

    /// Lazily paged quotes matching `filter`, ordered by id.
    pub fn list_quotes(&self, filter: QuoteFilter) -> Result<QuoteListing<'_>> {
        let expired = self.quotes.expire_overdue(self.clock.now())?;
        if expired > 0 {
            debug!(expired, "overdue quotes expired before listing");
        }
        Ok(QuoteListing {
            ledger: self,
            filter,
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    fn load(&self, quote_number: &str) -> Result<Quote> {
        self.quotes
            .find_by_number(quote_number.trim())?
            .ok_or_else(|| FflBroError::NotFound(format!("quote {quote_number}")))
    }

    fn expire_if_overdue(&self, quote: Quote, now: DateTime<Utc>) -> Result<Quote> {
        if !(quote.status.expires_lazily() && quote.is_overdue(now)) {
            return Ok(quote);
        }
        match self.quotes.update_status(&quote.quote_number, quote.status, QuoteStatus::Expired, now)?
        {
            Some(expired) => {
                debug!(quote_number = %expired.quote_number, "quote expired lazily");
                Ok(expired)
            }
            // Someone else moved it first; report what is stored now
            None => self.load(&quote.quote_number),
        }
    }
}

/// Lazy, paged iterator over quotes
pub struct QuoteListing<'a> {
    ledger: &'a QuoteLedger,
    filter: QuoteFilter,
    after: Option<QuoteId>,
    buffer: VecDeque<Quote>,
    exhausted: bool,
}

impl QuoteListing<'_> {
    fn fetch_page(&mut self) -> Result<()> {
        let limit = self.ledger.page_size;
        let page = self.ledger.quotes.list_page(&self.filter, self.after, limit)?;
        if page.len() < limit {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.after = Some(last.id);
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for QuoteListing<'_> {
    type Item = Result<Quote>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.buffer.is_empty() {
                if self.exhausted {
                    return None;
                }
                if let Err(err) = self.fetch_page() {
                    self.exhausted = true;
                    return Some(Err(err));
                }
                continue;
            }

            let quote = self.buffer.pop_front()?;
            // Quotes can go overdue while the listing is being consumed
            match self.ledger.expire_if_overdue(quote, self.ledger.clock.now()) {
                Ok(quote) if self.filter.matches(&quote) => return Some(Ok(quote)),
                Ok(_) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn normalize_customer(customer: CustomerInfo) -> Result<CustomerInfo> {
    let name = customer.name.trim();
    if name.is_empty() {
        return Err(FflBroError::InvalidInput("customer name is required".into()));
    }
    let clean = |value: Option<String>| {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };
    Ok(CustomerInfo {
        name: name.to_string(),
        email: clean(customer.email),
        phone: clean(customer.phone),
    })
}
