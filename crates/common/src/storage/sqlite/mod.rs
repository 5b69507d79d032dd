//! Pooled SQLite backend
//!
//! r2d2 pool over `rusqlite` connections with per-connection pragmas applied
//! on checkout creation.

pub mod config;
pub mod connection;
pub mod pool;
pub mod pragmas;

pub use config::SqlitePoolConfig;
pub use connection::{SqliteConnection, SqliteStatement};
pub use pool::SqlitePool;
pub use pragmas::apply_connection_pragmas;
