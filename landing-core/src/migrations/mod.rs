//! Bundled migrations - embedded SQL files
//!
//! The landing page schema ships with the binary so a fresh deployment can
//! seed its migrations directory. Files are written out by name and then
//! applied from disk like any other migration.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::result::Result;

/// Bundled migrations, embedded at compile time.
/// Format: (filename, sql_content)
///
/// When adding a new migration:
/// 1. Create the SQL file: NNN_description.sql
/// 2. Add an entry here in order
pub const BUNDLED_MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_landing_pages.sql",
        include_str!("001_create_landing_pages.sql"),
    ),
    (
        "002_add_workflow_fields.sql",
        include_str!("002_add_workflow_fields.sql"),
    ),
];

/// Write bundled migrations into `dir`, leaving existing files untouched
///
/// Returns the filenames that were written.
pub fn write_bundled(dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (filename, sql) in BUNDLED_MIGRATIONS {
        let path = dir.join(filename);
        if path.exists() {
            continue;
        }
        fs::write(&path, sql)?;
        info!(file = filename, "wrote bundled migration");
        written.push(filename.to_string());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::migration::split_statements;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_migrations_are_sorted() {
        let names: Vec<&str> = BUNDLED_MIGRATIONS.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_bundled_migrations_have_statements() {
        for (name, sql) in BUNDLED_MIGRATIONS {
            assert!(!split_statements(sql).is_empty(), "{} has no statements", name);
        }
    }

    #[test]
    fn test_write_bundled_skips_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("migrations");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(BUNDLED_MIGRATIONS[0].0), "-- customised").unwrap();

        let written = write_bundled(&dir).unwrap();
        assert_eq!(written.len(), BUNDLED_MIGRATIONS.len() - 1);
        assert_eq!(
            fs::read_to_string(dir.join(BUNDLED_MIGRATIONS[0].0)).unwrap(),
            "-- customised"
        );

        // Second call has nothing left to write
        assert!(write_bundled(&dir).unwrap().is_empty());
    }
}
