//! SQLite-backed product catalog.
//!
//! Search ranks rows in SQL with the same rules as
//! [`fflbro_domain::relevance_rank`] and pages with a keyset over
//! `(relevance, price_cents, id)`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fflbro_common::storage::SqliteConnection;
use fflbro_core::ProductRepository;
use fflbro_domain::{
    from_cents, to_cents, DistributorId, FflBroError, Product, ProductFields, ProductId, Result,
    SearchCursor, SearchQuery,
};
use rusqlite::{params, Row};

use super::columns::{count, limit_param, parsed, timestamp, to_millis};
use super::manager::{map_storage_error, DbManager};
use crate::errors::{constraint_violation, ConstraintViolation};

const PRODUCT_COLUMNS: &str =
    "id, distributor_id, item_number, manufacturer, description, price_cents, quantity, updated_at";

// ?1 needle, ?2 distributor filter, ?3 in-stock flag, ?4 has-cursor flag,
// ?5..?7 cursor, ?8 limit
const SEARCH_SQL: &str = "
    SELECT id, distributor_id, item_number, manufacturer, description, price_cents, quantity, updated_at
    FROM (
        SELECT p.*,
            CASE
                WHEN ?1 = '' THEN 0
                WHEN lower(p.manufacturer) = ?1 THEN 0
                WHEN substr(lower(p.manufacturer), 1, length(?1)) = ?1
                  OR substr(lower(p.description), 1, length(?1)) = ?1 THEN 1
                ELSE 2
            END AS relevance
        FROM products p
        WHERE (?1 = '' OR instr(lower(p.manufacturer), ?1) > 0 OR instr(lower(p.description), ?1) > 0)
          AND (?2 IS NULL OR p.distributor_id = ?2)
          AND (?3 = 0 OR p.quantity > 0)
    )
    WHERE ?4 = 0 OR (relevance, price_cents, id) > (?5, ?6, ?7)
    ORDER BY relevance, price_cents, id
    LIMIT ?8";

/// Product repository over the `products` table.
pub struct SqliteProductRepository {
    db: Arc<DbManager>,
}

impl SqliteProductRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<SqliteConnection> {
        self.db.get_connection()
    }
}

impl ProductRepository for SqliteProductRepository {
    fn upsert_product(
        &self,
        distributor_id: &DistributorId,
        item_number: &str,
        fields: &ProductFields,
        now: DateTime<Utc>,
    ) -> Result<ProductId> {
        let price_cents = to_cents(fields.price)?;
        self.conn()?
            .query_row(
                "INSERT INTO products
                    (distributor_id, item_number, manufacturer, description, price_cents, quantity, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(distributor_id, item_number) DO UPDATE SET
                    manufacturer = excluded.manufacturer,
                    description = excluded.description,
                    price_cents = excluded.price_cents,
                    quantity = excluded.quantity,
                    updated_at = excluded.updated_at
                 RETURNING id",
                params![
                    distributor_id.as_str(),
                    item_number,
                    fields.manufacturer,
                    fields.description,
                    price_cents,
                    fields.quantity,
                    to_millis(now),
                ],
                |row| row.get(0),
            )
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::ForeignKey) => {
                    FflBroError::UnknownDistributor(distributor_id.to_string())
                }
                _ => map_storage_error(err),
            })
    }

    fn find_product(&self, distributor_id: &DistributorId, item_number: &str) -> Result<Option<Product>> {
        self.conn()?
            .query_optional(
                &format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE distributor_id = ?1 AND item_number = ?2"
                ),
                params![distributor_id.as_str(), item_number],
                map_product,
            )
            .map_err(map_storage_error)
    }

    fn search_page(
        &self,
        query: &SearchQuery,
        after: Option<SearchCursor>,
        limit: usize,
    ) -> Result<Vec<Product>> {
        let needle = query.needle();
        let distributor = query.filters.distributor_id.as_ref().map(DistributorId::as_str);
        let (has_cursor, rank, price_cents, product_id) = match after {
            Some(cursor) => (true, cursor.rank, cursor.price_cents, cursor.product_id),
            None => (false, 0, 0, 0),
        };

        let conn = self.conn()?;
        let mut stmt = conn.prepare(SEARCH_SQL).map_err(map_storage_error)?;
        stmt.query_map(
            params![
                needle,
                distributor,
                query.filters.in_stock_only,
                has_cursor,
                rank,
                price_cents,
                product_id,
                limit_param(limit),
            ],
            map_product,
        )
        .map_err(map_storage_error)
    }

    fn count_by_distributor(&self) -> Result<BTreeMap<DistributorId, u64>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT distributor_id, COUNT(*) FROM products GROUP BY distributor_id")
            .map_err(map_storage_error)?;
        let rows = stmt
            .query_map(params![], |row| Ok((parsed::<DistributorId>(row, 0)?, count(row, 1)?)))
            .map_err(map_storage_error)?;
        Ok(rows.into_iter().collect())
    }

    fn count_in_stock(&self) -> Result<u64> {
        self.conn()?
            .query_row("SELECT COUNT(*) FROM products WHERE quantity > 0", params![], |row| {
                count(row, 0)
            })
            .map_err(map_storage_error)
    }

    fn sample(&self, distributor_id: &DistributorId, limit: usize) -> Result<Vec<Product>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE distributor_id = ?1
                 ORDER BY item_number LIMIT ?2"
            ))
            .map_err(map_storage_error)?;
        stmt.query_map(params![distributor_id.as_str(), limit_param(limit)], map_product)
            .map_err(map_storage_error)
    }
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        distributor_id: parsed(row, 1)?,
        item_number: row.get(2)?,
        manufacturer: row.get(3)?,
        description: row.get(4)?,
        price: from_cents(row.get(5)?),
        quantity: row.get(6)?,
        updated_at: timestamp(row, 7)?,
    })
}
