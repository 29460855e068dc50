//! Landing page service - lookup and upsert of page content

use std::sync::Arc;

use tracing::info;

use crate::adapters::duckdb::DuckDbStore;
use crate::domain::result::{Error, Result};
use crate::domain::{LandingPage, UpsertOutcome};

/// Service for reading and writing landing page content
pub struct LandingPageService {
    store: Arc<DuckDbStore>,
}

impl LandingPageService {
    pub fn new(store: Arc<DuckDbStore>) -> Self {
        Self { store }
    }

    /// Fetch a page by its public id
    ///
    /// Links are often pasted at the end of a sentence, so one trailing `.`
    /// is ignored.
    pub fn get(&self, landing_page_id: &str) -> Result<LandingPage> {
        let id = normalize_id(landing_page_id);
        if id.is_empty() {
            return Err(Error::validation("Missing id parameter"));
        }

        self.store
            .get_landing_page(id)?
            .ok_or_else(|| Error::not_found(format!("Landing page {}", id)))
    }

    /// Create a page, or replace the content of an existing one
    pub fn put(&self, page: &LandingPage) -> Result<UpsertOutcome> {
        if page.landing_page_id.trim().is_empty() {
            return Err(Error::validation("Missing landing_page_id parameter"));
        }

        let outcome = self.store.upsert_landing_page(page)?;
        match outcome {
            UpsertOutcome::Created { id } => {
                info!(landing_page_id = %page.landing_page_id, id, "landing page created")
            }
            UpsertOutcome::Updated { id } => {
                info!(landing_page_id = %page.landing_page_id, id, "landing page updated")
            }
        }
        Ok(outcome)
    }
}

fn normalize_id(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed)
}
