//! Quote number generation
//!
//! Numbers look like `Q2026-00042`: a year prefix and a per-year sequence.
//! Generation is optimistic; uniqueness is enforced by the store and the
//! ledger regenerates on collision.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use fflbro_domain::constants::{QUOTE_NUMBER_PREFIX, QUOTE_SEQUENCE_WIDTH};
use fflbro_domain::{FflBroError, Result};

use super::ports::QuoteRepository;

/// Seam for producing candidate quote numbers
pub trait QuoteNumberGenerator: Send + Sync {
    fn next_number(&self, now: DateTime<Utc>) -> Result<String>;
}

/// Next number after the highest one stored for the current year
pub struct SequentialQuoteNumbers {
    quotes: Arc<dyn QuoteRepository>,
}

impl SequentialQuoteNumbers {
    pub fn new(quotes: Arc<dyn QuoteRepository>) -> Self {
        Self { quotes }
    }
}

impl QuoteNumberGenerator for SequentialQuoteNumbers {
    fn next_number(&self, now: DateTime<Utc>) -> Result<String> {
        let year = now.year();
        let next = self
            .quotes
            .latest_sequence(year)?
            .checked_add(1)
            .ok_or_else(|| FflBroError::Internal(format!("quote sequence for {year} overflowed")))?;
        Ok(format_quote_number(year, next))
    }
}

pub fn format_quote_number(year: i32, sequence: u32) -> String {
    format!("{QUOTE_NUMBER_PREFIX}{year}-{sequence:0width$}", width = QUOTE_SEQUENCE_WIDTH)
}

/// Prefix shared by every number issued in `year`, e.g. `Q2026-`.
pub fn year_prefix(year: i32) -> String {
    format!("{QUOTE_NUMBER_PREFIX}{year}-")
}

/// Split a quote number into `(year, sequence)`.
pub fn parse_quote_number(number: &str) -> Option<(i32, u32)> {
    let rest = number.strip_prefix(QUOTE_NUMBER_PREFIX)?;
    let (year, sequence) = rest.split_once('-')?;
    Some((year.parse().ok()?, sequence.parse().ok()?))
}
