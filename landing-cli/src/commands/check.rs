//! Check command - parse pending migrations without applying them

use anyhow::{bail, Result};
use landing_core::services::MigrationService;

use super::{get_config, open_store, GlobalArgs};
use crate::output;

pub fn run(args: &GlobalArgs, json: bool) -> Result<()> {
    let config = get_config(args)?;
    let store = open_store(&config)?;
    let service = MigrationService::new(&store, &config.migrations_dir);
    let issues = service.check()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else if issues.is_empty() {
        output::success("All pending migrations parse cleanly");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Migration", "Statement", "Error"]);
        for issue in &issues {
            table.add_row(vec![
                issue.migration_name.clone(),
                issue.statement.to_string(),
                issue.message.clone(),
            ]);
        }
        println!("{}", table);
    }

    if !issues.is_empty() {
        bail!("{} with syntax errors", output::migration_count(issues.len()));
    }
    Ok(())
}
