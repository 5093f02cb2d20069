pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod resolver;
pub mod services;

pub use config::Config;
pub use db::Store;
pub use error::CoreError;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level when set.
pub fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
