//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level is used as the
//! filter directive. Installing twice is a no-op so tests and embedders can
//! call this freely.

use fflbro_domain::{FflBroError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber described by `config`.
///
/// # Errors
/// Returns `FflBroError::Config` when `config.level` is not a valid filter
/// directive (and `RUST_LOG` is unset).
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.level)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| FflBroError::Config(format!("invalid log level '{level}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_directives() {
        assert!(build_filter("info").is_ok());
        assert!(build_filter("fflbro_core=debug,warn").is_ok());
    }

    #[test]
    fn rejects_garbage_level() {
        assert!(matches!(build_filter("fflbro=verbose"), Err(FflBroError::Config(_))));
    }

    #[test]
    fn second_install_is_a_no_op() {
        let config = LoggingConfig::default();
        init_tracing(&config).unwrap();
        init_tracing(&config).unwrap();
    }
}
