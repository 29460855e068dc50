//! Configuration management
//!
//! Settings live in `<landing_dir>/settings.json`:
//! ```json
//! {
//!   "database": { "path": "landing.duckdb" },
//!   "migrations": { "dir": "migrations" }
//! }
//! ```
//! Relative paths resolve against the landing directory. Environment
//! variables `LANDING_DB_PATH` and `LANDING_MIGRATIONS_DIR` take precedence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::result::Result;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_DB_FILE: &str = "landing.duckdb";
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

pub const ENV_DB_PATH: &str = "LANDING_DB_PATH";
pub const ENV_MIGRATIONS_DIR: &str = "LANDING_MIGRATIONS_DIR";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    database: DatabaseSettings,
    #[serde(default)]
    migrations: MigrationSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MigrationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dir: Option<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub landing_dir: PathBuf,
    pub database_path: PathBuf,
    pub migrations_dir: PathBuf,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the landing directory and the process environment
    pub fn load(landing_dir: &Path) -> Result<Self> {
        Self::load_with_env(landing_dir, |key| std::env::var(key).ok())
    }

    /// Load config, reading environment overrides through `env`
    pub fn load_with_env(landing_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = landing_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %settings_path.display(), error = %e, "ignoring malformed settings");
                SettingsFile::default()
            })
        } else {
            SettingsFile::default()
        };

        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                landing_dir.join(p)
            }
        };

        let database_path = env(ENV_DB_PATH)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| raw.database.path.as_deref().map(resolve))
            .unwrap_or_else(|| landing_dir.join(DEFAULT_DB_FILE));

        let migrations_dir = env(ENV_MIGRATIONS_DIR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| raw.migrations.dir.as_deref().map(resolve))
            .unwrap_or_else(|| landing_dir.join(DEFAULT_MIGRATIONS_DIR));

        Ok(Self {
            landing_dir: landing_dir.to_path_buf(),
            database_path,
            migrations_dir,
            _raw_settings: raw,
        })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.landing_dir.join(SETTINGS_FILE)
    }

    /// Save config to the landing directory
    /// Preserves settings this crate doesn't manage
    pub fn save(&self) -> Result<()> {
        let settings_path = self.settings_path();

        let mut settings = self._raw_settings.clone();
        settings.database.path = Some(self.database_path.clone());
        settings.migrations.dir = Some(self.migrations_dir.clone());

        std::fs::create_dir_all(&self.landing_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Replace the database path (e.g. from a command line flag)
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    /// Replace the migrations directory (e.g. from a command line flag)
    pub fn with_migrations_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.migrations_dir = dir;
        }
        self
    }
}
