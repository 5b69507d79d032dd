//! Configuration loading and management
//!
//! This module provides utilities for loading ledger configuration from
//! files and environment variables.

pub mod loader;

// Re-export commonly used items
pub use loader::{apply_env_overrides, load, load_from_file, probe_config_paths};
