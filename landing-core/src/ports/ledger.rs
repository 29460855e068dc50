//! Ledger port - storage seen by the migration runner

use std::collections::BTreeSet;

use crate::domain::result::Result;
use crate::domain::MigrationRecord;

/// Storage that can execute migration SQL and remember what has run
///
/// Implementations own the connection; the runner only borrows the ledger
/// for the duration of a run.
pub trait MigrationLedger {
    /// Create the ledger table if it does not exist
    fn ensure_ledger(&self) -> Result<()>;

    /// Names of all recorded migrations
    ///
    /// An empty ledger is `Ok` with an empty set. Failure to read must be an
    /// error, never an empty set.
    fn applied_names(&self) -> Result<BTreeSet<String>>;

    /// All ledger rows, ordered by migration name
    fn applied_records(&self) -> Result<Vec<MigrationRecord>>;

    /// Execute a migration's statements in order and record it, atomically
    ///
    /// The statements and the ledger row commit together: either the
    /// migration is applied and recorded, or neither happens. A failing
    /// statement is `Error::MigrationFailed`; a failing ledger insert is
    /// `Error::Ledger`.
    fn apply_migration(&self, name: &str, statements: &[String]) -> Result<()>;

    /// Insert a ledger row without executing anything
    fn record_applied(&self, name: &str) -> Result<()>;
}
