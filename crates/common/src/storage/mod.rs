//! Storage primitives for pooled SQLite databases
//!
//! Connection pooling, per-connection pragmas, storage errors and pool
//! metrics. Schema ownership stays with the application layer.

pub mod error;
pub mod metrics;
pub mod sqlite;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use metrics::StorageMetrics;
pub use sqlite::{
    apply_connection_pragmas, SqliteConnection, SqlitePool, SqlitePoolConfig, SqliteStatement,
};
pub use types::{HealthStatus, PoolMetrics};
