//! In-memory adapters for mock mode and tests
//!
//! One [`MemoryStore`] implements every repository port over shared state so
//! referential rules (unknown distributor, distributor in use) match the
//! SQLite schema.

pub mod fixtures;
mod store;

pub use fixtures::{fixture_catalog, FixtureProduct};
pub use store::MemoryStore;
