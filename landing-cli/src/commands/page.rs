//! Page command - read and write landing page data

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use landing_core::{
    LandingContext, LandingPage, PhaseLine, UpsertOutcome, WorkflowBreakdown,
};
use serde::Serialize;

use super::{get_config, GlobalArgs};
use crate::output;

#[derive(Subcommand)]
pub enum PageCommands {
    /// Show a landing page by id
    Get {
        /// Landing page id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or update a landing page from a JSON document
    Put {
        /// JSON file with the page fields (reads stdin if omitted)
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Stored fields plus the values derived from them
#[derive(Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    page: &'a LandingPage,
    features: Vec<String>,
    loom_embed_url: Option<String>,
    workflow_breakdown: WorkflowBreakdown,
}

/// Open the database, bringing the schema up to date first
fn get_context(args: &GlobalArgs) -> Result<LandingContext> {
    let config = get_config(args)?;
    LandingContext::new(config).context("Failed to initialize landing context")
}

fn read_page(file: Option<&PathBuf>) -> Result<LandingPage> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid landing page JSON")
}

pub fn run(args: &GlobalArgs, command: PageCommands) -> Result<()> {
    match command {
        PageCommands::Get { id, json } => {
            let ctx = get_context(args)?;
            let page = ctx.landing_service.get(&id)?;

            if json {
                let view = PageView {
                    page: &page,
                    features: page.features(),
                    loom_embed_url: page.loom_embed_url(),
                    workflow_breakdown: page.workflow_breakdown(),
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            let mut table = output::create_table();
            let fields = [
                ("Id", Some(page.landing_page_id.clone())),
                ("Header", page.primary_header.clone()),
                ("Subheader", page.subheader.clone()),
                ("Logo", page.partner_logo_url.clone()),
                ("Video", page.loom_embed_url()),
                ("Brand color", page.brand_color.clone()),
                ("Workflow", page.workflow_name.clone()),
            ];
            for (label, value) in fields {
                table.add_row(vec![label.to_string(), value.unwrap_or_default()]);
            }
            println!("{}", table);

            let features = page.features();
            if !features.is_empty() {
                println!();
                println!("{}", "Features".bold());
                for feature in features {
                    println!("  • {}", feature);
                }
            }

            print_breakdown(&page.workflow_breakdown());
        }
        PageCommands::Put { file, json } => {
            let page = read_page(file.as_ref())?;
            let ctx = get_context(args)?;
            let outcome = ctx.landing_service.put(&page)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            match outcome {
                UpsertOutcome::Created { id } => output::success(&format!(
                    "Landing page {} created (id {})",
                    page.landing_page_id, id
                )),
                UpsertOutcome::Updated { id } => output::success(&format!(
                    "Landing page {} updated (id {})",
                    page.landing_page_id, id
                )),
            }
        }
    }
    Ok(())
}

fn print_breakdown(breakdown: &WorkflowBreakdown) {
    for phase in &breakdown.phases {
        println!();
        println!("{}", phase.title.bold());
        for line in &phase.lines {
            match line {
                PhaseLine::Detail { label, value } => println!("  {} {}", label.cyan(), value),
                PhaseLine::Freeform { text } => println!("  {}", text),
            }
        }
    }

    for card in &breakdown.cards {
        println!();
        println!("{}", card.title.bold());
        for item in &card.items {
            println!("  • {}", item);
        }
    }
}
