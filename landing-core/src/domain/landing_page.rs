//! Landing page domain model

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::workflow::WorkflowBreakdown;

static LOOM_SHARE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Content for one partner landing page, keyed by `landing_page_id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingPage {
    /// Database row id, assigned on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub landing_page_id: String,
    #[serde(default)]
    pub partner_logo_url: Option<String>,
    #[serde(default)]
    pub primary_header: Option<String>,
    #[serde(default)]
    pub subheader: Option<String>,
    #[serde(default)]
    pub loom_url: Option<String>,
    /// JSON array of strings, or a comma separated list
    #[serde(default)]
    pub features_list: Option<String>,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub workflow_name: Option<String>,
    /// Mermaid source for the workflow diagram
    #[serde(default)]
    pub workflow_chart: Option<String>,
    #[serde(default)]
    pub in_depth_workflow_breakdown: Option<String>,
    #[serde(default)]
    pub gtm_challenge_addressed: Option<String>,
    #[serde(default)]
    pub revenue_impact_summary: Option<String>,
    #[serde(default)]
    pub target_gtm_metrics_improved: Option<String>,
}

impl LandingPage {
    pub fn new(landing_page_id: impl Into<String>) -> Self {
        Self {
            landing_page_id: landing_page_id.into(),
            ..Self::default()
        }
    }

    /// Parsed feature bullets
    ///
    /// Accepts either `["a", "b"]` or `a, b`. Blank entries are dropped.
    pub fn features(&self) -> Vec<String> {
        let raw = match self.features_list.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Vec::new(),
        };

        let items = match serde_json::from_str::<Vec<String>>(raw) {
            Ok(items) => items,
            Err(_) => raw.split(',').map(str::to_string).collect(),
        };

        items
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    }

    /// Embeddable player URL for `loom_url`
    ///
    /// Share links (`loom.com/share/<id>`) become `https://www.loom.com/embed/<id>`.
    /// Embed links and unrecognised URLs are returned unchanged.
    pub fn loom_embed_url(&self) -> Option<String> {
        let url = self.loom_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        if url.contains("/embed/") {
            return Some(url.to_string());
        }

        let share_re = LOOM_SHARE_REGEX
            .get_or_init(|| Regex::new(r"loom\.com/share/([\w-]+)").expect("Invalid Loom regex"));
        match share_re.captures(url) {
            Some(caps) => Some(format!("https://www.loom.com/embed/{}", &caps[1])),
            None => Some(url.to_string()),
        }
    }

    /// Parsed `in_depth_workflow_breakdown`; empty when the field is unset
    pub fn workflow_breakdown(&self) -> WorkflowBreakdown {
        self.in_depth_workflow_breakdown
            .as_deref()
            .map(WorkflowBreakdown::parse)
            .unwrap_or_default()
    }
}

/// Whether an upsert created a new row or updated an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created { id: i64 },
    Updated { id: i64 },
}

impl UpsertOutcome {
    pub fn id(&self) -> i64 {
        match self {
            UpsertOutcome::Created { id } | UpsertOutcome::Updated { id } => *id,
        }
    }
}
