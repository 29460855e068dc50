//! Migration domain model

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// File extension recognised as a migration
pub const MIGRATION_EXTENSION: &str = "sql";

/// A ledger row: one migration that ran to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: i64,
    pub migration_name: String,
    pub executed_at: Option<NaiveDateTime>,
}

/// A `.sql` file in the migrations directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Filename including extension (e.g., "002_add_col.sql")
    pub filename: String,
    /// Ledger name: the filename without its extension (e.g., "002_add_col")
    pub name: String,
    pub path: PathBuf,
}

impl MigrationFile {
    /// Build a migration file from a path, if it has a `.sql` extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?.to_string();
        let name = migration_name(&filename)?.to_string();
        Some(Self {
            filename,
            name,
            path: path.to_path_buf(),
        })
    }
}

/// Derive the ledger name from a filename: "001_init.sql" -> "001_init"
///
/// Returns None for files that are not migrations.
pub fn migration_name(filename: &str) -> Option<&str> {
    let stem = filename.strip_suffix(MIGRATION_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Split migration text into executable statements
///
/// Statements are separated by `;`. Whole comment lines (`--`) at the start of
/// a segment are dropped, and empty segments are discarded. Semicolons inside
/// string literals or comments are not recognised.
pub fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .filter_map(|segment| {
            let mut rest = segment.trim();
            while rest.starts_with("--") {
                rest = match rest.split_once('\n') {
                    Some((_, tail)) => tail.trim(),
                    None => "",
                };
            }
            if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            }
        })
        .collect()
}

/// Transaction statements a migration file may carry for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionControl {
    /// `BEGIN`, `BEGIN TRANSACTION`, `START TRANSACTION`
    Begin,
    /// `COMMIT`, `END`, with optional `TRANSACTION`/`WORK`
    Commit,
    /// `ROLLBACK` or `ABORT`
    Rollback,
}

/// Classify a statement that only opens, commits or rolls back a transaction
///
/// Matching is case-insensitive and on the whole statement, so
/// `BEGIN TRANSACTION` matches but `END` inside a `CASE` expression does not.
pub fn transaction_control(statement: &str) -> Option<TransactionControl> {
    let words: Vec<String> = statement
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect();
    let (first, rest) = words.split_first()?;

    let kind = match first.as_str() {
        "BEGIN" => TransactionControl::Begin,
        "START" if rest.first().map(String::as_str) == Some("TRANSACTION") => {
            TransactionControl::Begin
        }
        "COMMIT" | "END" => TransactionControl::Commit,
        "ROLLBACK" | "ABORT" => TransactionControl::Rollback,
        _ => return None,
    };

    if rest.iter().all(|w| w == "TRANSACTION" || w == "WORK") {
        Some(kind)
    } else {
        None
    }
}

/// Result of running migrations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Names of newly applied migrations, in apply order
    pub applied: Vec<String>,
    /// Count of migrations that were already recorded in the ledger
    pub already_applied: usize,
}

impl MigrationResult {
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Snapshot of the ledger against the migrations directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub applied: Vec<MigrationRecord>,
    pub pending: Vec<String>,
}

/// Syntax problem found by a dry run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxIssue {
    pub migration_name: String,
    /// 1-based index of the statement within the file
    pub statement: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_name() {
        assert_eq!(migration_name("001_init.sql"), Some("001_init"));
        assert_eq!(migration_name("002.add.col.sql"), Some("002.add.col"));
        assert_eq!(migration_name("README.md"), None);
        assert_eq!(migration_name("notsql"), None);
        assert_eq!(migration_name(".sql"), None);
    }

    #[test]
    fn test_from_path() {
        let file = MigrationFile::from_path(Path::new("/srv/migrations/003_seed.sql")).unwrap();
        assert_eq!(file.filename, "003_seed.sql");
        assert_eq!(file.name, "003_seed");
        assert!(MigrationFile::from_path(Path::new("/srv/migrations/notes.txt")).is_none());
    }

    #[test]
    fn test_split_drops_empty_segments() {
        let stmts = split_statements("CREATE TABLE a (id INT);\n\n;  ;\nCREATE TABLE b (id INT);\n");
        assert_eq!(stmts, vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]);
    }

    #[test]
    fn test_split_ignores_comment_line_before_statement() {
        let stmts = split_statements("CREATE TABLE t (id INT); -- comment\nINSERT INTO t VALUES (1);");
        assert_eq!(stmts, vec!["CREATE TABLE t (id INT)", "INSERT INTO t VALUES (1)"]);
    }

    #[test]
    fn test_split_drops_comment_only_segments() {
        let stmts = split_statements("-- header\n-- more\n;CREATE TABLE t (id INT);\n-- trailing note");
        assert_eq!(stmts, vec!["CREATE TABLE t (id INT)"]);
    }

    #[test]
    fn test_split_keeps_inline_comments_after_code() {
        let stmts = split_statements("SELECT 1 -- one\n;");
        assert_eq!(stmts, vec!["SELECT 1 -- one"]);
    }

    #[test]
    fn test_transaction_control() {
        assert_eq!(transaction_control("BEGIN"), Some(TransactionControl::Begin));
        assert_eq!(transaction_control("begin transaction"), Some(TransactionControl::Begin));
        assert_eq!(transaction_control("START TRANSACTION"), Some(TransactionControl::Begin));
        assert_eq!(transaction_control("COMMIT"), Some(TransactionControl::Commit));
        assert_eq!(transaction_control("END TRANSACTION"), Some(TransactionControl::Commit));
        assert_eq!(transaction_control("Rollback"), Some(TransactionControl::Rollback));
        assert_eq!(transaction_control("ABORT"), Some(TransactionControl::Rollback));

        assert_eq!(transaction_control("START"), None);
        assert_eq!(transaction_control("CREATE TABLE t (id INT)"), None);
        assert_eq!(transaction_control("END LOOP"), None);
        assert_eq!(transaction_control(""), None);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("  \n\t").is_empty());
    }
}
