//! Mark command - record a migration as applied without running it

use anyhow::{bail, Context, Result};
use landing_core::services::MigrationService;

use super::{get_config, open_store, GlobalArgs};
use crate::output;

pub fn run(args: &GlobalArgs, name: &str) -> Result<()> {
    let config = get_config(args)?;
    let store = open_store(&config)?;
    let service = MigrationService::new(&store, &config.migrations_dir);

    let status = service.status()?;
    if !status.pending.iter().any(|pending| pending == name) {
        if status.applied.iter().any(|r| r.migration_name == name) {
            bail!("Migration {} is already recorded", name);
        }
        bail!(
            "No migration named {} in {}",
            name,
            config.migrations_dir.display()
        );
    }

    service
        .record_applied(name)
        .with_context(|| format!("Failed to record {}", name))?;
    output::success(&format!("Marked {} as applied", name));
    Ok(())
}
