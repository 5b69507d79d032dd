//! SQLite-backed sync progress records.
//!
//! Every state change is one conditional statement with `RETURNING`, so the
//! "only one running sync per distributor" rule holds across connections
//! without an explicit transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fflbro_common::storage::SqliteConnection;
use fflbro_core::SyncProgressRepository;
use fflbro_domain::{DistributorId, FflBroError, Result, SyncProgress, SyncStatus};
use rusqlite::{params, Row};
use tracing::debug;

use super::columns::{count, count_param, optional_timestamp, parsed, to_millis};
use super::manager::{map_storage_error, DbManager};
use crate::errors::{constraint_violation, ConstraintViolation};

const PROGRESS_COLUMNS: &str = "distributor_id, status, total_items, processed_items, current_item, \
                                last_error, started_at, finished_at, last_updated";

/// Sync progress repository over the `sync_progress` table.
pub struct SqliteSyncProgressRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncProgressRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<SqliteConnection> {
        self.db.get_connection()
    }
}

impl SyncProgressRepository for SqliteSyncProgressRepository {
    fn find_progress(&self, distributor_id: &DistributorId) -> Result<Option<SyncProgress>> {
        self.conn()?
            .query_optional(
                &format!("SELECT {PROGRESS_COLUMNS} FROM sync_progress WHERE distributor_id = ?1"),
                params![distributor_id.as_str()],
                map_progress,
            )
            .map_err(map_storage_error)
    }

    fn list_progress(&self) -> Result<Vec<SyncProgress>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {PROGRESS_COLUMNS} FROM sync_progress ORDER BY distributor_id"))
            .map_err(map_storage_error)?;
        stmt.query_map(params![], map_progress).map_err(map_storage_error)
    }

    fn begin_run(
        &self,
        distributor_id: &DistributorId,
        expected_total: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>> {
        let started = self
            .conn()?
            .query_optional(
                &format!(
                    "INSERT INTO sync_progress
                        (distributor_id, status, total_items, processed_items, current_item,
                         last_error, started_at, finished_at, last_updated)
                     VALUES (?1, 'running', ?2, 0, NULL, NULL, ?3, NULL, ?3)
                     ON CONFLICT(distributor_id) DO UPDATE SET
                        status = 'running',
                        total_items = excluded.total_items,
                        processed_items = 0,
                        current_item = NULL,
                        last_error = NULL,
                        started_at = excluded.started_at,
                        finished_at = NULL,
                        last_updated = excluded.last_updated
                     WHERE sync_progress.status <> 'running'
                     RETURNING {PROGRESS_COLUMNS}"
                ),
                params![distributor_id.as_str(), count_param(expected_total)?, to_millis(now)],
                map_progress,
            )
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::ForeignKey) => {
                    FflBroError::UnknownDistributor(distributor_id.to_string())
                }
                _ => map_storage_error(err),
            })?;
        if started.is_none() {
            debug!(%distributor_id, "begin_run lost to an active run");
        }
        Ok(started)
    }

    fn record_progress(
        &self,
        distributor_id: &DistributorId,
        delta: u64,
        current_item: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>> {
        self.conn()?
            .query_optional(
                &format!(
                    "UPDATE sync_progress SET
                        processed_items = processed_items + ?2,
                        total_items = MAX(total_items, processed_items + ?2),
                        current_item = ?3,
                        last_updated = ?4
                     WHERE distributor_id = ?1 AND status = 'running'
                     RETURNING {PROGRESS_COLUMNS}"
                ),
                params![distributor_id.as_str(), count_param(delta)?, current_item, to_millis(now)],
                map_progress,
            )
            .map_err(map_storage_error)
    }

    fn finish_run(
        &self,
        distributor_id: &DistributorId,
        outcome: SyncStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncProgress>> {
        self.conn()?
            .query_optional(
                &format!(
                    "UPDATE sync_progress SET
                        status = ?2,
                        last_error = ?3,
                        finished_at = ?4,
                        last_updated = ?4
                     WHERE distributor_id = ?1 AND status = 'running'
                     RETURNING {PROGRESS_COLUMNS}"
                ),
                params![distributor_id.as_str(), outcome.as_str(), error, to_millis(now)],
                map_progress,
            )
            .map_err(map_storage_error)
    }
}

fn map_progress(row: &Row<'_>) -> rusqlite::Result<SyncProgress> {
    Ok(SyncProgress {
        distributor_id: parsed(row, 0)?,
        status: parsed(row, 1)?,
        total_items: count(row, 2)?,
        processed_items: count(row, 3)?,
        current_item: row.get(4)?,
        last_error: row.get(5)?,
        started_at: optional_timestamp(row, 6)?,
        finished_at: optional_timestamp(row, 7)?,
        last_updated: optional_timestamp(row, 8)?,
    })
}
