//! Init command - seed the migrations directory and record the resolved paths

use anyhow::{Context, Result};
use landing_core::migrations::write_bundled;

use super::{get_config, GlobalArgs};
use crate::output;

pub fn run(args: &GlobalArgs) -> Result<()> {
    let config = get_config(args)?;
    let written = write_bundled(&config.migrations_dir).with_context(|| {
        format!("Failed to write migrations to {:?}", config.migrations_dir)
    })?;

    // Later commands find the same database and migrations without flags
    config
        .save()
        .with_context(|| format!("Failed to save {:?}", config.settings_path()))?;

    if written.is_empty() {
        output::info("Bundled migrations already present");
    } else {
        for filename in &written {
            println!("  {}", filename);
        }
        output::success(&format!(
            "Wrote {} to {}",
            output::migration_count(written.len()),
            config.migrations_dir.display()
        ));
    }
    output::info(&format!("Settings saved to {}", config.settings_path().display()));
    Ok(())
}
