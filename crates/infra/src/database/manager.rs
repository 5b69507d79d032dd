//! Database connection manager backed by the shared SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fflbro_common::storage::{
    PoolMetrics, SqliteConnection, SqlitePool, SqlitePoolConfig, StorageError,
};
use fflbro_domain::{DatabaseConfig, FflBroError, Result};
use rusqlite::params;
use tracing::{debug, info};

use crate::errors::InfraError;

pub(crate) const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps an [`SqlitePool`].
#[derive(Debug)]
pub struct DbManager {
    pool: Arc<SqlitePool>,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size and default pragmas.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let config = SqlitePoolConfig { max_size: pool_size.max(1), ..SqlitePoolConfig::default() };
        Self::with_pool_config(db_path, config)
    }

    /// Create a manager from the `[database]` configuration section.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let pool_config = SqlitePoolConfig {
            max_size: config.pool_size,
            connection_timeout: Duration::from_secs(config.connection_timeout_secs),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            enable_wal: config.enable_wal,
            enable_foreign_keys: true,
        };
        Self::with_pool_config(&config.path, pool_config)
    }

    fn with_pool_config<P: AsRef<Path>>(db_path: P, config: SqlitePoolConfig) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let pool = SqlitePool::open(&path, config).map_err(map_storage_error)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.config().max_size,
            "sqlite pool initialised"
        );

        Ok(Self { pool: Arc::new(pool), path })
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &Arc<SqlitePool> {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get_connection().map_err(map_storage_error)
    }

    /// Ensure the full schema exists on the current database.
    ///
    /// Idempotent. Refuses to touch a database written by a newer schema.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)?;
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let status = self.pool.health_check();
        if !status.healthy {
            return Err(FflBroError::Database(
                status.message.unwrap_or_else(|| "connection pool unhealthy".into()),
            ));
        }

        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(map_storage_error)?;
        drop(conn);

        let metrics = self.pool_metrics();
        debug!(
            active = status.active_connections,
            idle = status.idle_connections,
            acquired = metrics.connections_acquired,
            timeouts = metrics.connections_timeout,
            errors = metrics.connections_error,
            avg_acquisition_ms = metrics.avg_acquisition_time_ms,
            "database healthy"
        );
        Ok(())
    }

    /// Connection checkout counters since the pool opened.
    pub fn pool_metrics(&self) -> PoolMetrics {
        self.pool.metrics()
    }
}

fn create_schema(conn: &SqliteConnection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;

    let found: i32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", params![], |row| {
            row.get(0)
        })
        .map_err(map_storage_error)?;
    if found > SCHEMA_VERSION {
        return Err(map_storage_error(StorageError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }));
    }

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER) * 1000)",
        params![SCHEMA_VERSION],
    )
    .map_err(map_storage_error)?;
    Ok(())
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> FflBroError {
    FflBroError::from(InfraError::from(err))
}

pub(crate) fn map_storage_error(err: StorageError) -> FflBroError {
    FflBroError::from(InfraError::from(err))
}
