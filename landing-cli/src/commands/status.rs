//! Status command - show applied and pending migrations

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color};
use landing_core::services::MigrationService;

use super::{get_config, open_store, GlobalArgs};
use crate::output;

pub fn run(args: &GlobalArgs, json: bool) -> Result<()> {
    let config = get_config(args)?;
    let store = open_store(&config)?;
    let status = MigrationService::new(&store, &config.migrations_dir).status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Migration Status".bold());
    println!("Database:   {}", config.database_path.display());
    println!("Migrations: {}", config.migrations_dir.display());
    println!();

    if status.applied.is_empty() && status.pending.is_empty() {
        output::info("No migrations found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Migration", "Status", "Executed At"]);

    for record in &status.applied {
        let executed_at = record
            .executed_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&record.migration_name),
            Cell::new("applied").fg(Color::Green),
            Cell::new(executed_at),
        ]);
    }
    for name in &status.pending {
        table.add_row(vec![
            Cell::new(name),
            Cell::new("pending").fg(Color::Yellow),
            Cell::new(""),
        ]);
    }

    println!("{}", table);
    println!();

    if status.pending.is_empty() {
        output::success("Database is up to date");
    } else {
        output::warning(&format!(
            "{} pending",
            output::migration_count(status.pending.len())
        ));
    }

    Ok(())
}
