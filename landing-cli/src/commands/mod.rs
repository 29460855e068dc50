//! CLI command implementations

pub mod check;
pub mod init;
pub mod mark;
pub mod migrate;
pub mod page;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use landing_core::adapters::duckdb::DuckDbStore;
use landing_core::config::Config;

/// Path overrides accepted by every command
pub struct GlobalArgs {
    pub db: Option<PathBuf>,
    pub migrations_dir: Option<PathBuf>,
}

/// Get the landing directory from environment or default
pub fn get_landing_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LANDING_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".landing"))
}

/// Resolve configuration: flags > environment > settings.json > defaults
pub fn get_config(args: &GlobalArgs) -> Result<Config> {
    let landing_dir = get_landing_dir()?;
    let config = Config::load(&landing_dir)
        .with_context(|| format!("Failed to load settings from {:?}", landing_dir))?;

    Ok(config
        .with_database_path(args.db.clone())
        .with_migrations_dir(args.migrations_dir.clone()))
}

/// Open the configured database without running migrations
pub fn open_store(config: &Config) -> Result<DuckDbStore> {
    DuckDbStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))
}
