//! SQLite connection pool configuration

use std::time::Duration;

/// r2d2 pool and pragma settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlitePoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,

    /// How long a checkout may wait for a free connection
    pub connection_timeout: Duration,

    /// How long SQLite waits on a locked database before returning BUSY
    pub busy_timeout: Duration,

    pub enable_wal: bool,
    pub enable_foreign_keys: bool,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_millis(5000),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}
