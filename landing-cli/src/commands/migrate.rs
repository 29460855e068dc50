//! Migrate command - apply pending migrations

use anyhow::{Context, Result};
use colored::Colorize;

use super::{get_config, GlobalArgs};
use crate::output;

pub fn run(args: &GlobalArgs, json: bool) -> Result<()> {
    let config = get_config(args)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    let result = runtime
        .block_on(landing_core::migrate(config))
        .context("Migration failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.is_up_to_date() {
        output::success("All migrations are up to date");
        return Ok(());
    }

    for name in &result.applied {
        println!("  {} {}", "applied".green(), name);
    }
    output::success(&format!(
        "Successfully executed {}",
        output::migration_count(result.applied.len())
    ));
    Ok(())
}
