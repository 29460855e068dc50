//! Core domain entities
//!
//! Pure data structures and parsing helpers - no I/O.

mod landing_page;
pub mod migration;
pub mod result;
pub mod workflow;

pub use landing_page::{LandingPage, UpsertOutcome};
pub use migration::{
    MigrationFile, MigrationRecord, MigrationResult, MigrationStatus, SyntaxIssue,
    TransactionControl,
};
pub use workflow::{CardKind, PhaseLine, WorkflowBreakdown, WorkflowCard, WorkflowPhase};
