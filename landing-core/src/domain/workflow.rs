//! Workflow breakdown parsing
//!
//! A breakdown is lightly formatted text stored with a landing page:
//!
//! ```text
//! ### Phase 1: Capture
//! **Trigger:** Form submitted
//! Enrichment runs before routing.
//!
//! ### ROI Projection
//! - 20% more meetings
//! ```
//!
//! `### Title` starts a section. Text before the first title is ignored.
//! Inside phase sections, a line opening with a bold label (`**Label:**`)
//! becomes a labelled detail and anything else is kept as free text.
//! Sections titled "Integration Architecture", "Success Measurement" or
//! "ROI Projection" are summary cards whose lines are bullet items.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BOLD_REGEX: OnceLock<Regex> = OnceLock::new();
static LABEL_REGEX: OnceLock<Regex> = OnceLock::new();
static BREAK_REGEX: OnceLock<Regex> = OnceLock::new();

const SECTION_MARKER: &str = "### ";

/// Summary card recognised by its section title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    IntegrationArchitecture,
    SuccessMeasurement,
    RoiProjection,
}

impl CardKind {
    /// Card kind for a section title, matched case-insensitively anywhere in it
    pub fn from_title(title: &str) -> Option<Self> {
        let lower = title.to_lowercase();
        if lower.contains("integration architecture") {
            Some(CardKind::IntegrationArchitecture)
        } else if lower.contains("success measurement") {
            Some(CardKind::SuccessMeasurement)
        } else if lower.contains("roi projection") {
            Some(CardKind::RoiProjection)
        } else {
            None
        }
    }
}

/// One line of a phase section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseLine {
    /// `**Label:** value`; the label keeps its trailing colon
    Detail { label: String, value: String },
    Freeform { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPhase {
    pub title: String,
    pub lines: Vec<PhaseLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowCard {
    pub kind: CardKind,
    pub title: String,
    pub items: Vec<String>,
}

/// Parsed breakdown: phases in text order, then summary cards in text order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowBreakdown {
    pub phases: Vec<WorkflowPhase>,
    pub cards: Vec<WorkflowCard>,
}

impl WorkflowBreakdown {
    pub fn parse(text: &str) -> Self {
        let mut breakdown = Self::default();

        for (title, body) in sections(text) {
            match CardKind::from_title(&title) {
                Some(kind) => breakdown.cards.push(WorkflowCard {
                    kind,
                    title,
                    items: card_items(&body),
                }),
                None => breakdown.phases.push(WorkflowPhase {
                    title,
                    lines: phase_lines(&body),
                }),
            }
        }

        breakdown
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty() && self.cards.is_empty()
    }
}

/// Split text into `(title, body)` pairs at `### ` lines
fn sections(text: &str) -> Vec<(String, Vec<&str>)> {
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(title) = trimmed.strip_prefix(SECTION_MARKER) {
            sections.push((strip_bold(title.trim()), Vec::new()));
        } else if let Some((_, body)) = sections.last_mut() {
            body.push(trimmed);
        }
    }
    sections
}

fn phase_lines(body: &[&str]) -> Vec<PhaseLine> {
    let label_re = LABEL_REGEX
        .get_or_init(|| Regex::new(r"^\*\*(.+?:)\*\*\s*(.*)$").expect("Invalid label regex"));

    body.iter()
        .filter(|line| !line.is_empty())
        .map(|line| match label_re.captures(line) {
            Some(caps) => PhaseLine::Detail {
                label: caps[1].trim().to_string(),
                value: strip_bold(caps[2].trim()),
            },
            None => PhaseLine::Freeform {
                text: strip_bold(line),
            },
        })
        .collect()
}

fn card_items(body: &[&str]) -> Vec<String> {
    let break_re =
        BREAK_REGEX.get_or_init(|| Regex::new(r"<br\s*/?>").expect("Invalid line break regex"));

    body.iter()
        .flat_map(|line| break_re.split(*line))
        .map(|item| {
            item.trim()
                .trim_start_matches(['-', '•', '→'])
                .trim_start()
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .map(|item| strip_bold(&item))
        .collect()
}

/// Remove `**` emphasis markers, keeping the emphasised text
fn strip_bold(text: &str) -> String {
    let bold_re =
        BOLD_REGEX.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("Invalid bold regex"));
    bold_re.replace_all(text, "$1").into_owned()
}
