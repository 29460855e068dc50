//! DuckDB storage adapter

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use duckdb::{params, Connection};
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{LandingPage, MigrationRecord, UpsertOutcome};
use crate::ports::MigrationLedger;

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const CREATE_LEDGER_SQL: &str = "
    CREATE SEQUENCE IF NOT EXISTS migrations_id_seq START 1;
    CREATE TABLE IF NOT EXISTS migrations (
        id BIGINT PRIMARY KEY DEFAULT nextval('migrations_id_seq'),
        migration_name VARCHAR NOT NULL UNIQUE,
        executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
";

const RECORD_MIGRATION_SQL: &str = "INSERT INTO migrations (migration_name) VALUES (?)";

const LANDING_PAGE_COLUMNS: &str = "id, landing_page_id, partner_logo_url, primary_header, subheader,
     loom_url, features_list, brand_color, workflow_name, workflow_chart,
     in_depth_workflow_breakdown, gtm_challenge_addressed, revenue_impact_summary,
     target_gtm_metrics_improved";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

/// DuckDB-backed ledger and landing page store
///
/// Owns the single connection used by a run. The connection is closed when
/// the store is dropped.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    /// Open (or create) a database file
    ///
    /// Parent directories are created as needed. Lock contention from another
    /// process is retried with exponential backoff.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut attempt = 0;
        loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    debug!(path = %db_path.display(), "opened database");
                    return Ok(Self {
                        conn: Mutex::new(conn),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    attempt += 1;
                    if !is_retryable_error(&err_msg) || attempt >= MAX_RETRIES {
                        return Err(Error::database(format!(
                            "Failed to open {}: {}",
                            db_path.display(),
                            err_msg
                        )));
                    }
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt - 1));
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        attempt,
                        max_attempts = MAX_RETRIES,
                        error = %err_msg,
                        "database busy, retrying"
                    );
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn try_open_connection(db_path: &Path) -> std::result::Result<Connection, duckdb::Error> {
        // Extension autoloading stays off; nothing here needs network fetches
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Execute raw SQL outside of any migration
    #[cfg(any(test, feature = "test-utils"))]
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Count rows of a table
    #[cfg(any(test, feature = "test-utils"))]
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    // === Landing pages ===

    pub fn get_landing_page(&self, landing_page_id: &str) -> Result<Option<LandingPage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM landing_pages WHERE landing_page_id = ?",
            LANDING_PAGE_COLUMNS
        ))?;
        let page = optional(stmt.query_row([landing_page_id], row_to_landing_page))?;
        Ok(page)
    }

    /// Insert a page, or update the existing row with the same `landing_page_id`
    pub fn upsert_landing_page(&self, page: &LandingPage) -> Result<UpsertOutcome> {
        let conn = self.conn()?;

        let existing: Option<i64> = optional(conn.query_row(
            "SELECT id FROM landing_pages WHERE landing_page_id = ?",
            [&page.landing_page_id],
            |row| row.get(0),
        ))?;

        if let Some(id) = existing {
            conn.execute(
                "UPDATE landing_pages SET
                    partner_logo_url = ?, primary_header = ?, subheader = ?, loom_url = ?,
                    features_list = ?, brand_color = ?, workflow_name = ?, workflow_chart = ?,
                    in_depth_workflow_breakdown = ?, gtm_challenge_addressed = ?,
                    revenue_impact_summary = ?, target_gtm_metrics_improved = ?,
                    updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?",
                params![
                    page.partner_logo_url,
                    page.primary_header,
                    page.subheader,
                    page.loom_url,
                    page.features_list,
                    page.brand_color,
                    page.workflow_name,
                    page.workflow_chart,
                    page.in_depth_workflow_breakdown,
                    page.gtm_challenge_addressed,
                    page.revenue_impact_summary,
                    page.target_gtm_metrics_improved,
                    id,
                ],
            )?;
            return Ok(UpsertOutcome::Updated { id });
        }

        let id: i64 = conn.query_row(
            "INSERT INTO landing_pages (
                landing_page_id, partner_logo_url, primary_header, subheader, loom_url,
                features_list, brand_color, workflow_name, workflow_chart,
                in_depth_workflow_breakdown, gtm_challenge_addressed,
                revenue_impact_summary, target_gtm_metrics_improved
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                page.landing_page_id,
                page.partner_logo_url,
                page.primary_header,
                page.subheader,
                page.loom_url,
                page.features_list,
                page.brand_color,
                page.workflow_name,
                page.workflow_chart,
                page.in_depth_workflow_breakdown,
                page.gtm_challenge_addressed,
                page.revenue_impact_summary,
                page.target_gtm_metrics_improved,
            ],
            |row| row.get(0),
        )?;
        Ok(UpsertOutcome::Created { id })
    }
}

impl MigrationLedger for DuckDbStore {
    fn ensure_ledger(&self) -> Result<()> {
        self.conn()?
            .execute_batch(CREATE_LEDGER_SQL)
            .map_err(|e| Error::Ledger(format!("Failed to create migrations table: {}", e)))
    }

    fn applied_names(&self) -> Result<BTreeSet<String>> {
        let unreadable = |e: duckdb::Error| Error::LedgerUnreadable(e.to_string());

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT migration_name FROM migrations")
            .map_err(unreadable)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(unreadable)?;

        let mut result = BTreeSet::new();
        for name in names {
            result.insert(name.map_err(unreadable)?);
        }
        Ok(result)
    }

    fn applied_records(&self) -> Result<Vec<MigrationRecord>> {
        let unreadable = |e: duckdb::Error| Error::LedgerUnreadable(e.to_string());

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, migration_name, executed_at::VARCHAR
                 FROM migrations ORDER BY migration_name",
            )
            .map_err(unreadable)?;
        let rows = stmt
            .query_map([], |row| {
                let executed_at: Option<String> = row.get(2)?;
                Ok(MigrationRecord {
                    id: row.get(0)?,
                    migration_name: row.get(1)?,
                    executed_at: executed_at.as_deref().and_then(parse_timestamp),
                })
            })
            .map_err(unreadable)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record.map_err(unreadable)?);
        }
        Ok(records)
    }

    fn apply_migration(&self, name: &str, statements: &[String]) -> Result<()> {
        let mut conn = self.conn()?;
        // Dropping an uncommitted transaction rolls it back
        let tx = conn
            .transaction()
            .map_err(|e| Error::migration_failed(name, e))?;

        for (index, statement) in statements.iter().enumerate() {
            debug!(migration = name, statement = index + 1, "executing statement");
            tx.execute_batch(statement)
                .map_err(|e| Error::migration_failed(name, e))?;
        }

        tx.execute(RECORD_MIGRATION_SQL, [name])
            .map_err(|e| record_error(name, e))?;

        tx.commit().map_err(|e| Error::migration_failed(name, e))
    }

    fn record_applied(&self, name: &str) -> Result<()> {
        self.conn()?
            .execute(RECORD_MIGRATION_SQL, [name])
            .map_err(|e| record_error(name, e))?;
        Ok(())
    }
}

fn record_error(name: &str, err: duckdb::Error) -> Error {
    Error::Ledger(format!("Failed to record migration {}: {}", name, err))
}

/// Map "no rows" to None
fn optional<T>(result: duckdb::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn row_to_landing_page(row: &duckdb::Row) -> duckdb::Result<LandingPage> {
    Ok(LandingPage {
        id: row.get(0)?,
        landing_page_id: row.get(1)?,
        partner_logo_url: row.get(2)?,
        primary_header: row.get(3)?,
        subheader: row.get(4)?,
        loom_url: row.get(5)?,
        features_list: row.get(6)?,
        brand_color: row.get(7)?,
        workflow_name: row.get(8)?,
        workflow_chart: row.get(9)?,
        in_depth_workflow_breakdown: row.get(10)?,
        gtm_challenge_addressed: row.get(11)?,
        revenue_impact_summary: row.get(12)?,
        target_gtm_metrics_improved: row.get(13)?,
    })
}

/// Parse DuckDB's VARCHAR rendering of a TIMESTAMP ("2026-01-14 23:59:59.123")
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}
