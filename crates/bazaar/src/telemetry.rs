//! # Telemetry
//!
//! Installs the global `tracing` subscriber. Log levels are taken from
//! `RUST_LOG` and fall back to [`DEFAULT_DIRECTIVES`].

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Filter directives used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber, reading directives from `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    install(filter)
}

/// Install the global subscriber with explicit filter directives, for example
/// `"bazaar_orm=debug"`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_with(directives: &str) -> Result<()> {
    install(EnvFilter::new(directives))
}

fn install(filter: EnvFilter) -> Result<()> {
    Registry::default()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .context("issue installing tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_fails() {
        // the first call may race with other tests in this binary
        let _ = init_with("debug");
        let err = init_with("debug").unwrap_err();
        assert!(err.to_string().contains("tracing subscriber"));
    }
}
