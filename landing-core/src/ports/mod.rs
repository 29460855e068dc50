//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The migration
//! runner depends only on these traits, not on a concrete database.

mod ledger;

pub use ledger::MigrationLedger;
