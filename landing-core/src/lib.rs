//! Landing Core - schema migrations and landing page storage
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Migration and landing page entities, statement splitting,
//!   workflow breakdown parsing
//! - **ports**: The `MigrationLedger` trait the runner is written against
//! - **services**: Migration runner and landing page service
//! - **adapters**: DuckDB implementation of the ledger and page store

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::sync::Arc;

use adapters::duckdb::DuckDbStore;
use config::Config;
use services::{LandingPageService, MigrationService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    CardKind, LandingPage, MigrationFile, MigrationRecord, MigrationResult, MigrationStatus,
    PhaseLine, SyntaxIssue, UpsertOutcome, WorkflowBreakdown, WorkflowCard, WorkflowPhase,
};

/// Open the configured database and apply pending migrations
///
/// The blocking work runs on tokio's blocking pool. The connection is
/// opened for this run only and closed before the future resolves, whether
/// the run succeeds or fails.
pub async fn migrate(config: Config) -> Result<MigrationResult> {
    tokio::task::spawn_blocking(move || {
        let store = DuckDbStore::open(&config.database_path)?;
        MigrationService::new(&store, &config.migrations_dir).run()
    })
    .await
    .map_err(|e| Error::Other(format!("Migration task failed: {}", e)))?
}

/// Main context for landing page operations
///
/// Holds the configuration and an open store with its schema up to date.
pub struct LandingContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub landing_service: LandingPageService,
}

impl LandingContext {
    /// Open the database and apply pending migrations before serving data
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(DuckDbStore::open(&config.database_path)?);
        MigrationService::new(store.as_ref(), &config.migrations_dir).run()?;

        let landing_service = LandingPageService::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            landing_service,
        })
    }
}
