//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const DEFAULT_FILTER: &str = "info,fixture_kit=debug";

/// Default directives; with SQL logging on, SeaORM statements are shown too
pub fn default_filter(config: &Config) -> String {
    if config.log_sql {
        format!("{},sea_orm=debug,sqlx=info", DEFAULT_FILTER)
    } else {
        DEFAULT_FILTER.to_string()
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the defaults.
/// Returns false when a subscriber was already installed.
pub fn init(config: &Config) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
