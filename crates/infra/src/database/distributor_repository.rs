//! SQLite-backed distributor registry.

use std::sync::Arc;

use fflbro_common::storage::SqliteConnection;
use fflbro_core::DistributorRepository;
use fflbro_domain::{Distributor, DistributorId, FflBroError, ReadinessState, Result};
use rusqlite::{params, Row};

use super::columns::parsed;
use super::manager::{map_storage_error, DbManager};
use crate::errors::{constraint_violation, ConstraintViolation};

const DISTRIBUTOR_COLUMNS: &str = "id, name, status";

/// Distributor repository; list order is registration order.
pub struct SqliteDistributorRepository {
    db: Arc<DbManager>,
}

impl SqliteDistributorRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<SqliteConnection> {
        self.db.get_connection()
    }
}

impl DistributorRepository for SqliteDistributorRepository {
    fn list_distributors(&self) -> Result<Vec<Distributor>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {DISTRIBUTOR_COLUMNS} FROM distributors ORDER BY position"))
            .map_err(map_storage_error)?;
        stmt.query_map(params![], map_distributor).map_err(map_storage_error)
    }

    fn find_distributor(&self, id: &DistributorId) -> Result<Option<Distributor>> {
        self.conn()?
            .query_optional(
                &format!("SELECT {DISTRIBUTOR_COLUMNS} FROM distributors WHERE id = ?1"),
                params![id.as_str()],
                map_distributor,
            )
            .map_err(map_storage_error)
    }

    fn insert_distributor(&self, distributor: &Distributor) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO distributors (id, name, status, position)
                 VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(position), 0) + 1 FROM distributors))",
                params![distributor.id.as_str(), distributor.name, distributor.status.as_str()],
            )
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::Unique) => {
                    FflBroError::AlreadyExists(format!("distributor {}", distributor.id))
                }
                _ => map_storage_error(err),
            })?;
        Ok(())
    }

    fn update_status(&self, id: &DistributorId, status: ReadinessState) -> Result<bool> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE distributors SET status = ?2 WHERE id = ?1",
                params![id.as_str(), status.as_str()],
            )
            .map_err(map_storage_error)?;
        Ok(changed > 0)
    }

    fn delete_distributor(&self, id: &DistributorId) -> Result<()> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM distributors WHERE id = ?1", params![id.as_str()])
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::ForeignKey) => {
                    FflBroError::InUse(format!("distributor {id} still has products or sync history"))
                }
                _ => map_storage_error(err),
            })?;
        if deleted == 0 {
            return Err(FflBroError::UnknownDistributor(id.to_string()));
        }
        Ok(())
    }
}

fn map_distributor(row: &Row<'_>) -> rusqlite::Result<Distributor> {
    Ok(Distributor { id: parsed(row, 0)?, name: row.get(1)?, status: parsed(row, 2)? })
}
