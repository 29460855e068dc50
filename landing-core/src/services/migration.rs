//! Migration service - applies `.sql` files from a directory
//!
//! Each file is one forward migration named after its filename (without the
//! extension). Files are applied in lexicographic order. A file's statements
//! and its ledger row commit in a single transaction, so a failed file leaves
//! no trace and an applied file is always recorded.
//!
//! Files may wrap themselves in `BEGIN; ... COMMIT;`. Those statements are
//! dropped since the runner already owns the transaction. `ROLLBACK` is
//! rejected before anything executes.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;
use tracing::{debug, error, info, warn};

use crate::domain::migration::{
    split_statements, transaction_control, TransactionControl, MIGRATION_EXTENSION,
};
use crate::domain::result::{Error, Result};
use crate::domain::{MigrationFile, MigrationResult, MigrationStatus, SyntaxIssue};
use crate::ports::MigrationLedger;

/// Service for applying migrations from a directory
pub struct MigrationService<'a, L: MigrationLedger + ?Sized> {
    ledger: &'a L,
    migrations_dir: PathBuf,
}

impl<'a, L: MigrationLedger + ?Sized> MigrationService<'a, L> {
    /// Create a migration service over an injected ledger
    pub fn new(ledger: &'a L, migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            ledger,
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Run all pending migrations
    ///
    /// This is the main entry point. It:
    /// 1. Ensures the ledger table exists
    /// 2. Loads the names already recorded
    /// 3. Applies pending files in sorted order, recording each one in the
    ///    same transaction as its statements
    ///
    /// Stops at the first failure; later files are left unapplied.
    pub fn run(&self) -> Result<MigrationResult> {
        info!(dir = %self.migrations_dir.display(), "starting database migrations");

        self.ensure_ledger()?;
        let applied = self.load_applied_names()?;
        let pending = self.list_pending_files(&applied)?;

        info!(
            pending = pending.len(),
            already_applied = applied.len(),
            "found migration files"
        );

        let mut result = MigrationResult {
            applied: Vec::new(),
            already_applied: applied.len(),
        };

        for file in &pending {
            info!(migration = %file.name, "applying migration");
            if let Err(e) = self.apply_file(file) {
                error!(migration = %file.name, error = %e, "migration failed");
                return Err(e);
            }
            result.applied.push(file.name.clone());
        }

        if result.is_up_to_date() {
            info!("all migrations are up to date");
        } else {
            info!(count = result.applied.len(), "applied migrations");
        }

        Ok(result)
    }

    /// Create the ledger table if absent
    pub fn ensure_ledger(&self) -> Result<()> {
        self.ledger.ensure_ledger()?;
        info!("migrations table ready");
        Ok(())
    }

    /// Names of migrations already recorded
    ///
    /// An unreadable ledger is an error. Treating it as empty would re-apply
    /// every migration.
    pub fn load_applied_names(&self) -> Result<BTreeSet<String>> {
        self.ledger.applied_names().map_err(|e| match e {
            Error::LedgerUnreadable(_) => e,
            other => Error::LedgerUnreadable(other.to_string()),
        })
    }

    /// Migration files not yet in `applied`, sorted by filename
    ///
    /// A missing directory is created and yields no files.
    pub fn list_pending_files(&self, applied: &BTreeSet<String>) -> Result<Vec<MigrationFile>> {
        let files = self.list_files()?;
        Ok(files
            .into_iter()
            .filter(|file| {
                let skip = applied.contains(&file.name);
                if skip {
                    info!(migration = %file.name, "skipping, already executed");
                }
                !skip
            })
            .collect())
    }

    /// All migration files in the directory, sorted by filename
    pub fn list_files(&self) -> Result<Vec<MigrationFile>> {
        if !self.migrations_dir.exists() {
            info!(dir = %self.migrations_dir.display(), "no migrations directory found, creating");
            fs::create_dir_all(&self.migrations_dir)?;
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.migrations_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            match MigrationFile::from_path(&path) {
                Some(file) => files.push(file),
                None if entry.file_name().to_str().is_none() && is_sql_path(&path) => {
                    warn!(path = %path.display(), "ignoring migration with a non UTF-8 filename");
                }
                None => continue,
            }
        }

        // Filename order is the apply order
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    /// Execute every statement of one file and record it, in a single transaction
    pub fn apply_file(&self, file: &MigrationFile) -> Result<()> {
        let content = fs::read_to_string(&file.path)
            .map_err(|e| Error::migration_failed(&file.name, e))?;
        let statements = executable_statements(&file.name, split_statements(&content))?;

        if statements.is_empty() {
            warn!(migration = %file.name, "migration contains no statements");
        }

        self.ledger.apply_migration(&file.name, &statements)?;
        info!(migration = %file.name, statements = statements.len(), "executed migration");
        Ok(())
    }

    /// Record a migration as applied without executing it
    ///
    /// For schema changes that were made by hand. Recording a name twice is a
    /// ledger error.
    pub fn record_applied(&self, name: &str) -> Result<()> {
        self.ledger.ensure_ledger()?;
        self.ledger.record_applied(name).map_err(|e| {
            error!(migration = name, error = %e, "failed to record migration");
            match e {
                Error::Ledger(_) => e,
                other => Error::Ledger(other.to_string()),
            }
        })?;
        info!(migration = name, "marked migration as executed");
        Ok(())
    }

    /// Applied ledger rows and pending file names, without applying anything
    pub fn status(&self) -> Result<MigrationStatus> {
        self.ledger.ensure_ledger()?;
        let records = self.ledger.applied_records()?;
        let applied: BTreeSet<String> = records.iter().map(|r| r.migration_name.clone()).collect();
        let pending = self
            .list_files()?
            .into_iter()
            .filter(|file| !applied.contains(&file.name))
            .map(|file| file.name)
            .collect();

        Ok(MigrationStatus {
            applied: records,
            pending,
        })
    }

    /// Parse pending migrations without executing them
    ///
    /// Reports at most one issue per file: the first statement that fails to
    /// parse.
    pub fn check(&self) -> Result<Vec<SyntaxIssue>> {
        self.ledger.ensure_ledger()?;
        let applied = self.load_applied_names()?;
        let mut issues = Vec::new();

        for file in self.list_pending_files(&applied)? {
            let content = fs::read_to_string(&file.path)?;
            if let Some(issue) = check_statements(&file.name, &split_statements(&content)) {
                issues.push(issue);
            }
        }

        Ok(issues)
    }
}

/// Drop a file's own `BEGIN`/`COMMIT` statements, rejecting `ROLLBACK`
fn executable_statements(name: &str, statements: Vec<String>) -> Result<Vec<String>> {
    let mut kept = Vec::with_capacity(statements.len());
    for (index, statement) in statements.into_iter().enumerate() {
        match transaction_control(&statement) {
            None => kept.push(statement),
            Some(TransactionControl::Rollback) => {
                return Err(Error::migration_failed(
                    name,
                    format!(
                        "statement {} is {}; migrations already run in their own transaction",
                        index + 1,
                        statement
                    ),
                ));
            }
            Some(_) => {
                debug!(
                    migration = name,
                    statement = index + 1,
                    sql = %statement,
                    "skipping transaction statement"
                );
            }
        }
    }
    Ok(kept)
}

fn is_sql_path(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == MIGRATION_EXTENSION)
}

/// First statement of a migration that the DuckDB dialect cannot parse
pub fn check_statements(name: &str, statements: &[String]) -> Option<SyntaxIssue> {
    let dialect = DuckDbDialect {};
    statements.iter().enumerate().find_map(|(index, sql)| {
        Parser::parse_sql(&dialect, sql).err().map(|e| {
            let msg = e.to_string();
            SyntaxIssue {
                migration_name: name.to_string(),
                statement: index + 1,
                message: msg.trim_start_matches("sql parser error: ").to_string(),
            }
        })
    })
}
