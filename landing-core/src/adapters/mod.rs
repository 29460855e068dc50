//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the MigrationLedger port and landing page storage

pub mod duckdb;
