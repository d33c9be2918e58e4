use std::process;
use std::sync::LazyLock;

use figment::{Figment, providers::Env};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Shared secret expected in the `X-API-Key` request header.
    pub api_key: String,

    /// Primary database file, resolved against the working directory.
    #[serde(default = "default_db_file")]
    pub db_file: String,

    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

fn default_db_file() -> String {
    "test.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

/// Process-wide configuration, read once from `DUCKGATE_*` environment
/// variables (`.env` is loaded beforehand in `main`).
pub static CONFIG: LazyLock<Config> = LazyLock::new(load);

fn load() -> Config {
    let cfg: Config = match Figment::new().merge(Env::prefixed("DUCKGATE_")).extract() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("fatal: invalid configuration: {e}");
            process::exit(1);
        }
    };
    if cfg.api_key.trim().is_empty() {
        eprintln!("fatal: DUCKGATE_API_KEY must be set in the environment or in a .env file");
        process::exit(1);
    }
    cfg
}
