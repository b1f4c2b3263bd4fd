//! Runtime configuration.
//!
//! Values come from command-line flags first, then environment variables
//! (a `.env` file in the working directory is honoured), then defaults.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Overrides the store file location
pub const STORE_ENV: &str = "ROTA_STORE";
/// Log filter directives, e.g. `rota=debug`
pub const LOG_ENV: &str = "ROTA_LOG";

const DEFAULT_LOG_FILTER: &str = "rota=warn";
const VERBOSE_LOG_FILTER: &str = "rota=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ROTA_STORE is set but empty")]
    EmptyStorePath,

    #[error("Could not determine a data directory; pass --store or set ROTA_STORE")]
    NoDataDir,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file holding members, projects and partners
    pub store_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: String,
}

impl Config {
    pub fn resolve(cli_store: Option<PathBuf>, verbose: bool) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_path = match cli_store {
            Some(path) => path,
            None => match env::var(STORE_ENV) {
                Ok(value) if value.trim().is_empty() => return Err(ConfigError::EmptyStorePath),
                Ok(value) => PathBuf::from(value),
                Err(_) => default_store_path()?,
            },
        };

        let log_filter = match env::var(LOG_ENV) {
            Ok(value) if !value.trim().is_empty() => value,
            _ if verbose => VERBOSE_LOG_FILTER.to_string(),
            _ => DEFAULT_LOG_FILTER.to_string(),
        };

        Ok(Self {
            store_path,
            log_filter,
        })
    }
}

fn default_store_path() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("rota").join("store.json"))
        .ok_or(ConfigError::NoDataDir)
}
