//! Integration tests for the migration runner
//!
//! These tests run migrations from real files against real DuckDB databases.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use landing_core::adapters::duckdb::DuckDbStore;
use landing_core::ports::MigrationLedger;
use landing_core::services::MigrationService;
use landing_core::Error;

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a migrations directory inside the temp dir with the given files
fn create_migrations(temp_dir: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let dir = temp_dir.path().join("migrations");
    fs::create_dir_all(&dir).unwrap();
    for (name, sql) in files {
        fs::write(dir.join(name), sql).unwrap();
    }
    dir
}

/// Open a file-backed store in the temp dir
fn create_store(temp_dir: &TempDir) -> DuckDbStore {
    DuckDbStore::open(&temp_dir.path().join("test.duckdb")).expect("Failed to open database")
}

fn ledger_names(store: &DuckDbStore) -> Vec<String> {
    store.applied_names().unwrap().into_iter().collect()
}

fn run(store: &DuckDbStore, dir: &Path) -> landing_core::Result<landing_core::MigrationResult> {
    MigrationService::new(store, dir).run()
}

// ============================================================================
// Fresh and repeated runs
// ============================================================================

/// A fresh run applies every file in sorted order and records each one
#[test]
fn test_fresh_run_applies_all_in_sorted_order() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[
            ("003_seed.sql", "INSERT INTO events VALUES (1, 'launch');"),
            ("001_create.sql", "CREATE TABLE events (id INTEGER);"),
            ("002_add_name.sql", "ALTER TABLE events ADD COLUMN name VARCHAR;"),
        ],
    );
    let store = create_store(&temp_dir);

    let result = run(&store, &dir).unwrap();

    // 002 must run before 003 or the two-column insert fails
    assert_eq!(result.applied, vec!["001_create", "002_add_name", "003_seed"]);
    assert_eq!(result.already_applied, 0);
    assert_eq!(ledger_names(&store), vec!["001_create", "002_add_name", "003_seed"]);
    assert_eq!(store.count_rows("events").unwrap(), 1);
}

/// Running twice applies nothing the second time and leaves the ledger alone
#[test]
fn test_second_run_is_a_no_op() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[
            ("001_create.sql", "CREATE TABLE events (id INTEGER);"),
            ("002_seed.sql", "INSERT INTO events VALUES (1);"),
        ],
    );
    let store = create_store(&temp_dir);

    run(&store, &dir).unwrap();
    let before = store.applied_records().unwrap();

    let second = run(&store, &dir).unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(second.already_applied, 2);
    assert_eq!(store.applied_records().unwrap(), before);
    assert_eq!(store.count_rows("events").unwrap(), 1);
}

/// The ledger survives closing and reopening the database file
#[test]
fn test_ledger_persists_across_connections() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(&temp_dir, &[("001_create.sql", "CREATE TABLE events (id INTEGER);")]);

    {
        let store = create_store(&temp_dir);
        run(&store, &dir).unwrap();
    }

    let store = create_store(&temp_dir);
    let result = run(&store, &dir).unwrap();
    assert!(result.applied.is_empty());
    assert_eq!(ledger_names(&store), vec!["001_create"]);
}

/// Only files missing from the ledger are applied
#[test]
fn test_only_unrecorded_files_are_applied() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[
            // Would fail if re-applied: the table already exists
            ("001_init.sql", "CREATE TABLE accounts (id INTEGER);"),
            ("002_add_col.sql", "ALTER TABLE accounts ADD COLUMN email VARCHAR;"),
        ],
    );
    let store = create_store(&temp_dir);
    store.execute_batch("CREATE TABLE accounts (id INTEGER);").unwrap();
    store.ensure_ledger().unwrap();
    store.record_applied("001_init").unwrap();

    let result = run(&store, &dir).unwrap();

    assert_eq!(result.applied, vec!["002_add_col"]);
    assert_eq!(result.already_applied, 1);
    assert_eq!(ledger_names(&store), vec!["001_init", "002_add_col"]);
}

// ============================================================================
// Failures
// ============================================================================

/// An invalid statement halts the run after 001 and before 003
#[test]
fn test_invalid_migration_halts_run() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[
            ("001_create.sql", "CREATE TABLE events (id INTEGER);"),
            (
                "002_x.sql",
                "CREATE TABLE half_done (id INTEGER);\nCREAT TABLE broken (id INTEGER);",
            ),
            ("003_more.sql", "CREATE TABLE later (id INTEGER);"),
        ],
    );
    let store = create_store(&temp_dir);

    let err = run(&store, &dir).unwrap_err();

    assert!(matches!(err, Error::MigrationFailed { ref name, .. } if name == "002_x"));
    assert_eq!(ledger_names(&store), vec!["001_create"]);
    assert!(store.count_rows("events").is_ok());
    // 002 ran in a transaction, so its first statement was rolled back
    assert!(store.count_rows("half_done").is_err());
    // 003 was never attempted
    assert!(store.count_rows("later").is_err());
}

/// Fixing the broken file lets the next run pick up where it stopped
#[test]
fn test_rerun_after_fix_resumes() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[
            ("001_create.sql", "CREATE TABLE events (id INTEGER);"),
            ("002_x.sql", "CREAT TABLE broken (id INTEGER);"),
        ],
    );
    let store = create_store(&temp_dir);
    assert!(run(&store, &dir).is_err());

    fs::write(dir.join("002_x.sql"), "CREATE TABLE fixed (id INTEGER);").unwrap();
    let result = run(&store, &dir).unwrap();

    assert_eq!(result.applied, vec!["002_x"]);
    assert_eq!(ledger_names(&store), vec!["001_create", "002_x"]);
}

// ============================================================================
// File handling
// ============================================================================

/// A comment line between statements is ignored; both statements run
#[test]
fn test_comment_line_between_statements() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[(
            "001_t.sql",
            "CREATE TABLE t (id INT); -- comment\nINSERT INTO t VALUES (1);",
        )],
    );
    let store = create_store(&temp_dir);

    run(&store, &dir).unwrap();

    assert_eq!(store.count_rows("t").unwrap(), 1);
}

/// A file that wraps itself in BEGIN/COMMIT runs inside the runner's transaction
#[test]
fn test_file_with_own_transaction_applies() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[(
            "001_tx.sql",
            "BEGIN TRANSACTION;\nCREATE TABLE t (id INT);\nINSERT INTO t VALUES (1);\nCOMMIT;",
        )],
    );
    let store = create_store(&temp_dir);

    let result = run(&store, &dir).unwrap();

    assert_eq!(result.applied, vec!["001_tx"]);
    assert_eq!(store.count_rows("t").unwrap(), 1);
}

/// A failing statement after the file's own BEGIN still rolls back everything
#[test]
fn test_file_with_own_transaction_rolls_back_on_failure() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[(
            "001_tx.sql",
            "BEGIN;\nCREATE TABLE t (id INT);\nINSERT INTO missing VALUES (1);\nCOMMIT;",
        )],
    );
    let store = create_store(&temp_dir);

    let err = run(&store, &dir).unwrap_err();

    assert!(matches!(err, Error::MigrationFailed { ref name, .. } if name == "001_tx"));
    assert!(store.count_rows("t").is_err());
    assert!(ledger_names(&store).is_empty());
}

/// A migration whose ledger row cannot be written leaves no schema behind
#[test]
fn test_unrecordable_migration_is_not_applied() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[("001_create.sql", "CREATE TABLE events (id INTEGER);")],
    );
    let store = create_store(&temp_dir);
    // A ledger that refuses this name, so recording fails after the statements ran
    store
        .execute_batch(
            "CREATE TABLE migrations (
                id BIGINT,
                migration_name VARCHAR NOT NULL,
                executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                CHECK (migration_name <> '001_create')
            )",
        )
        .unwrap();

    let err = run(&store, &dir).unwrap_err();

    assert!(matches!(err, Error::Ledger(_)));
    assert!(store.count_rows("events").is_err());
}

/// A missing migrations directory is created and the run succeeds
#[test]
fn test_missing_directory_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("does-not-exist");
    let store = create_store(&temp_dir);

    let result = run(&store, &dir).unwrap();

    assert!(dir.is_dir());
    assert!(result.applied.is_empty());
    assert!(ledger_names(&store).is_empty());
}

/// An empty file is recorded like any other migration
#[test]
fn test_empty_file_is_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(&temp_dir, &[("001_placeholder.sql", "-- nothing yet\n")]);
    let store = create_store(&temp_dir);

    let result = run(&store, &dir).unwrap();

    assert_eq!(result.applied, vec!["001_placeholder"]);
}

/// Status reports recorded rows and pending names without applying
#[test]
fn test_status_does_not_apply() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_migrations(
        &temp_dir,
        &[
            ("001_create.sql", "CREATE TABLE events (id INTEGER);"),
            ("002_seed.sql", "INSERT INTO events VALUES (1);"),
        ],
    );
    let store = create_store(&temp_dir);
    let service = MigrationService::new(&store, &dir);

    let status = service.status().unwrap();
    assert!(status.applied.is_empty());
    assert_eq!(status.pending, vec!["001_create", "002_seed"]);
    assert!(store.count_rows("events").is_err());

    service.run().unwrap();
    let status = service.status().unwrap();
    assert_eq!(status.applied.len(), 2);
    assert!(status.pending.is_empty());
}
