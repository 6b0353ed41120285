//! Legacy text format of the summary.
//!
//! The stored blob is split on `\n` by the front end, which styles each line
//! by substring: `🚨`, `⚠️`, `🔍`, then `===`. Headers and markers must not
//! change.

use serde::{Deserialize, Serialize};

use crate::Summary;

pub const ALERTS_HEADER: &str = "=== ALERTAS IMPORTANTES ===";
pub const GENERAL_HEADER: &str = "=== RESUMO GERAL ===";

/// Renders the alert section and the general section separated by a blank line.
pub fn render_legacy_text(summary: &Summary) -> String {
    let alerts = summary
        .flags
        .iter()
        .map(|flag| flag.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let general = summary.narrative_lines.join("\n");

    format!("{ALERTS_HEADER}\n{alerts}\n\n{GENERAL_HEADER}\n{general}")
}

/// Display style the front end applies to a line of the stored text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Critical,
    Important,
    Preventive,
    SectionHeader,
    Plain,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::Preventive => "preventive",
            Self::SectionHeader => "section_header",
            Self::Plain => "plain",
        }
    }
}

/// Style for one line, checked in the same precedence as the UI.
pub fn classify_line(line: &str) -> LineStyle {
    if line.contains("🚨") {
        LineStyle::Critical
    } else if line.contains("⚠️") {
        LineStyle::Important
    } else if line.contains("🔍") {
        LineStyle::Preventive
    } else if line.contains("===") {
        LineStyle::SectionHeader
    } else {
        LineStyle::Plain
    }
}

/// Splits a stored blob into lines and styles each one.
pub fn classify_text(text: &str) -> Vec<(LineStyle, &str)> {
    text.split('\n')
        .map(|line| (classify_line(line), line))
        .collect()
}
