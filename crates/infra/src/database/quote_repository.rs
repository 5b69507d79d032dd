//! SQLite-backed quote ledger.
//!
//! Totals are stored as cents next to the tax rate that produced them and are
//! never rewritten; only `status` and `updated_at` change after insert.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fflbro_common::storage::SqliteConnection;
use fflbro_core::quotes::numbering::year_prefix;
use fflbro_core::QuoteRepository;
use fflbro_domain::{
    from_cents, to_cents, CustomerInfo, FflBroError, NewQuote, Quote, QuoteFilter, QuoteId,
    QuoteStatus, Result,
};
use rusqlite::{params, Row};
use tracing::debug;

use super::columns::{json, limit_param, parsed, timestamp, to_millis};
use super::manager::{map_storage_error, DbManager};
use crate::errors::{constraint_violation, ConstraintViolation, InfraError};

const QUOTE_COLUMNS: &str = "id, quote_number, customer_name, customer_email, customer_phone, \
                             line_items, subtotal_cents, tax_rate, tax_cents, total_cents, status, \
                             created_at, expires_at, updated_at";

/// Quote repository over the `quotes` table.
pub struct SqliteQuoteRepository {
    db: Arc<DbManager>,
}

impl SqliteQuoteRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<SqliteConnection> {
        self.db.get_connection()
    }
}

impl QuoteRepository for SqliteQuoteRepository {
    fn insert_quote(&self, quote: &NewQuote) -> Result<Quote> {
        let line_items = serde_json::to_string(&quote.line_items).map_err(InfraError::from)?;
        let created_at = to_millis(quote.created_at);

        self.conn()?
            .query_row(
                &format!(
                    "INSERT INTO quotes
                        (quote_number, customer_name, customer_email, customer_phone, line_items,
                         subtotal_cents, tax_rate, tax_cents, total_cents, status,
                         created_at, expires_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?11)
                     RETURNING {QUOTE_COLUMNS}"
                ),
                params![
                    quote.quote_number,
                    quote.customer.name,
                    quote.customer.email,
                    quote.customer.phone,
                    line_items,
                    to_cents(quote.totals.subtotal)?,
                    quote.tax_rate.to_string(),
                    to_cents(quote.totals.tax)?,
                    to_cents(quote.totals.total)?,
                    quote.status.as_str(),
                    created_at,
                    to_millis(quote.expires_at),
                ],
                map_quote,
            )
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::Unique) => {
                    FflBroError::AlreadyExists(format!("quote {}", quote.quote_number))
                }
                _ => map_storage_error(err),
            })
    }

    fn find_by_number(&self, quote_number: &str) -> Result<Option<Quote>> {
        self.conn()?
            .query_optional(
                &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE quote_number = ?1"),
                params![quote_number],
                map_quote,
            )
            .map_err(map_storage_error)
    }

    fn update_status(
        &self,
        quote_number: &str,
        from: QuoteStatus,
        to: QuoteStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Quote>> {
        self.conn()?
            .query_optional(
                &format!(
                    "UPDATE quotes SET status = ?3, updated_at = ?4
                     WHERE quote_number = ?1 AND status = ?2
                     RETURNING {QUOTE_COLUMNS}"
                ),
                params![quote_number, from.as_str(), to.as_str(), to_millis(now)],
                map_quote,
            )
            .map_err(map_storage_error)
    }

    fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self
            .conn()?
            .execute(
                "UPDATE quotes SET status = 'expired', updated_at = ?1
                 WHERE status IN ('pending', 'sent') AND expires_at < ?1",
                params![to_millis(now)],
            )
            .map_err(map_storage_error)?;
        if expired > 0 {
            debug!(expired, "overdue quotes marked expired");
        }
        Ok(expired)
    }

    fn list_page(&self, filter: &QuoteFilter, after: Option<QuoteId>, limit: usize) -> Result<Vec<Quote>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {QUOTE_COLUMNS} FROM quotes
                 WHERE id > ?1
                   AND (?2 IS NULL OR status = ?2)
                   AND (?3 IS NULL OR lower(customer_email) = lower(?3))
                 ORDER BY id
                 LIMIT ?4"
            ))
            .map_err(map_storage_error)?;
        stmt.query_map(
            params![
                after.unwrap_or(0),
                filter.status.map(|status| status.as_str()),
                filter.customer_email.as_deref(),
                limit_param(limit),
            ],
            map_quote,
        )
        .map_err(map_storage_error)
    }

    fn latest_sequence(&self, year: i32) -> Result<u32> {
        let prefix = year_prefix(year);
        let latest: i64 = self
            .conn()?
            .query_row(
                "SELECT COALESCE(MAX(CAST(substr(quote_number, ?2) AS INTEGER)), 0)
                 FROM quotes WHERE substr(quote_number, 1, ?3) = ?1",
                params![prefix, limit_param(prefix.len() + 1), limit_param(prefix.len())],
                |row| row.get(0),
            )
            .map_err(map_storage_error)?;
        u32::try_from(latest)
            .map_err(|_| FflBroError::Internal(format!("quote sequence out of range: {latest}")))
    }
}

fn map_quote(row: &Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get(0)?,
        quote_number: row.get(1)?,
        customer: CustomerInfo { name: row.get(2)?, email: row.get(3)?, phone: row.get(4)? },
        line_items: json(row, 5)?,
        subtotal: from_cents(row.get(6)?),
        tax_rate: parsed(row, 7)?,
        tax: from_cents(row.get(8)?),
        total: from_cents(row.get(9)?),
        status: parsed(row, 10)?,
        created_at: timestamp(row, 11)?,
        expires_at: timestamp(row, 12)?,
        updated_at: timestamp(row, 13)?,
    })
}
