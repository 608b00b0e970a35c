//! Rubric feedback parsing.
//!
//! Two line formats are recognised, selected by [`RubricVersion`]:
//!
//! ```text
//! Graduated:  1. COLLABORATION: [Met] - Worked with the patient as a partner.
//! Binary:     **Collaboration (9 pts): Meets Criteria** - Strong partnership.
//! ```
//!
//! Parsing is line-oriented. Lines that do not match the version's format
//! are skipped; status keywords are matched case-insensitively with any
//! amount of inner whitespace. Only categories the evaluator actually
//! emitted are returned.

use std::collections::HashSet;
use std::sync::LazyLock;

use motivate_core::models::rubric::{RubricCategory, RubricStatus, RubricVersion, category_key};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::RubricParseError;

pub const DEFAULT_GRADUATED_POINTS: f64 = 7.5;
pub const DEFAULT_PARTIAL_CREDIT: f64 = 0.6;

/// Categories the legacy graduated rubric scores.
pub const GRADUATED_CATEGORIES: [&str; 4] = ["Collaboration", "Evocation", "Acceptance", "Compassion"];

/// Categories and point values of the current binary rubric (40 total).
pub const BINARY_CATEGORIES: [(&str, f64); 6] = [
    ("Collaboration", 9.0),
    ("Acceptance", 6.0),
    ("Compassion", 6.0),
    ("Evocation", 6.0),
    ("Summary", 3.0),
    ("Response Factor", 10.0),
];

static GRADUATED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-•]\s+)?\*{0,2}\s*\d+\s*[.)]\s*(?P<name>[^:*]+?)\s*\*{0,2}\s*:\s*\*{0,2}\s*\[?\s*(?P<status>partially\s+met|not\s+met|met)\s*\]?\s*\*{0,2}\s*(?:[-\x{2013}\x{2014}:.]\s*(?P<comment>.*?))?\s*$",
    )
    .expect("graduated line pattern is valid")
});

static BINARY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-•]\s+)?\*{0,2}\s*(?P<name>[^(*]+?)\s*\(\s*(?P<points>\d+(?:\.\d+)?)\s*(?:pts?|points?)\.?\s*\)\s*:\s*\*{0,2}\s*(?P<status>meets\s+criteria|needs\s+improvement)\s*\*{0,2}\s*(?:[-\x{2013}\x{2014}:.]\s*(?P<comment>.*?))?\s*$",
    )
    .expect("binary line pattern is valid")
});

/// Names of the categories a complete evaluation emits for `version`.
pub fn expected_categories(version: RubricVersion) -> Vec<&'static str> {
    match version {
        RubricVersion::Graduated => GRADUATED_CATEGORIES.to_vec(),
        RubricVersion::Binary => BINARY_CATEGORIES.iter().map(|(name, _)| *name).collect(),
    }
}

#[derive(Debug, Clone)]
pub struct RubricParser {
    graduated_points: f64,
    partial_credit: f64,
}

impl RubricParser {
    /// `graduated_points` is the value of each graduated category;
    /// `partial_credit` is the fraction of it a "Partially Met" earns.
    pub fn new(graduated_points: f64, partial_credit: f64) -> Self {
        Self {
            graduated_points,
            partial_credit,
        }
    }

    /// Parse feedback into categories, in the order they appear.
    ///
    /// A category name that repeats (compared case- and punctuation-
    /// insensitively) keeps its first occurrence. Fails when the text is
    /// blank or no line matches the version's format.
    pub fn parse(
        &self,
        feedback: &str,
        version: RubricVersion,
    ) -> Result<Vec<RubricCategory>, RubricParseError> {
        if feedback.trim().is_empty() {
            return Err(RubricParseError::EmptyFeedback);
        }

        let mut categories = Vec::new();
        let mut seen = HashSet::new();
        let mut lines_scanned = 0;

        for line in feedback.lines() {
            lines_scanned += 1;
            let parsed = match version {
                RubricVersion::Graduated => self.parse_graduated(line),
                RubricVersion::Binary => parse_binary(line)?,
            };
            let Some(category) = parsed else {
                continue;
            };

            if !seen.insert(category_key(&category.name)) {
                warn!(
                    category = %category.name,
                    "duplicate rubric category in feedback, keeping first occurrence"
                );
                continue;
            }

            debug!(
                category = %category.name,
                status = %category.status,
                earned = category.earned_points,
                max = category.max_points,
                "parsed rubric line"
            );
            categories.push(category);
        }

        if categories.is_empty() {
            return Err(RubricParseError::NoCategories {
                version,
                lines_scanned,
            });
        }

        Ok(categories)
    }

    fn parse_graduated(&self, line: &str) -> Option<RubricCategory> {
        let caps = GRADUATED_LINE.captures(line)?;
        let status = match normalize_status(&caps["status"]).as_str() {
            "met" => RubricStatus::Met,
            "partially met" => RubricStatus::PartiallyMet,
            _ => RubricStatus::NotMet,
        };
        let max_points = self.graduated_points;
        let earned_points = match status {
            RubricStatus::Met => max_points,
            RubricStatus::PartiallyMet => max_points * self.partial_credit,
            _ => 0.0,
        };

        Some(RubricCategory {
            name: caps["name"].trim().to_string(),
            max_points,
            status,
            earned_points,
            comment: comment(&caps),
        })
    }
}

impl Default for RubricParser {
    fn default() -> Self {
        Self::new(DEFAULT_GRADUATED_POINTS, DEFAULT_PARTIAL_CREDIT)
    }
}

fn parse_binary(line: &str) -> Result<Option<RubricCategory>, RubricParseError> {
    let Some(caps) = BINARY_LINE.captures(line) else {
        return Ok(None);
    };
    let name = caps["name"].trim().to_string();
    let max_points = caps["points"]
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| RubricParseError::InvalidPoints {
            category: name.clone(),
            value: caps["points"].to_string(),
        })?;
    let status = match normalize_status(&caps["status"]).as_str() {
        "meets criteria" => RubricStatus::MeetsCriteria,
        _ => RubricStatus::NeedsImprovement,
    };
    let earned_points = match status {
        RubricStatus::MeetsCriteria => max_points,
        _ => 0.0,
    };

    Ok(Some(RubricCategory {
        name,
        max_points,
        status,
        earned_points,
        comment: comment(&caps),
    }))
}

fn normalize_status(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn comment(caps: &regex::Captures<'_>) -> String {
    caps.name("comment")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
