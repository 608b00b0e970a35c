use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An MI technique the student must demonstrate before a session may end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TechniqueCategory {
    OpenEndedQuestion,
    Reflection,
    Autonomy,
    Summary,
}

impl TechniqueCategory {
    /// Every category, in reporting order.
    pub const ALL: [TechniqueCategory; 4] = [
        TechniqueCategory::OpenEndedQuestion,
        TechniqueCategory::Reflection,
        TechniqueCategory::Autonomy,
        TechniqueCategory::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueCategory::OpenEndedQuestion => "open_ended_question",
            TechniqueCategory::Reflection => "reflection",
            TechniqueCategory::Autonomy => "autonomy",
            TechniqueCategory::Summary => "summary",
        }
    }
}

impl fmt::Display for TechniqueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which techniques a session has demonstrated so far.
///
/// Flags only ever go from `false` to `true` within a session. The default
/// value (nothing demonstrated) is also what a session starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CoverageState {
    pub open_ended_question: bool,
    pub reflection: bool,
    pub autonomy: bool,
    pub summary: bool,
}

impl CoverageState {
    /// A state with every technique demonstrated.
    pub fn complete() -> Self {
        Self {
            open_ended_question: true,
            reflection: true,
            autonomy: true,
            summary: true,
        }
    }

    pub fn is_demonstrated(&self, category: TechniqueCategory) -> bool {
        match category {
            TechniqueCategory::OpenEndedQuestion => self.open_ended_question,
            TechniqueCategory::Reflection => self.reflection,
            TechniqueCategory::Autonomy => self.autonomy,
            TechniqueCategory::Summary => self.summary,
        }
    }

    /// Set the flag for `category`.
    pub fn mark(&mut self, category: TechniqueCategory) {
        match category {
            TechniqueCategory::OpenEndedQuestion => self.open_ended_question = true,
            TechniqueCategory::Reflection => self.reflection = true,
            TechniqueCategory::Autonomy => self.autonomy = true,
            TechniqueCategory::Summary => self.summary = true,
        }
    }

    /// OR another state into this one.
    pub fn merge(&mut self, other: CoverageState) {
        for category in TechniqueCategory::ALL {
            if other.is_demonstrated(category) {
                self.mark(category);
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        TechniqueCategory::ALL
            .iter()
            .all(|c| self.is_demonstrated(*c))
    }

    /// Categories not yet demonstrated, in [`TechniqueCategory::ALL`] order.
    pub fn missing(&self) -> Vec<TechniqueCategory> {
        TechniqueCategory::ALL
            .into_iter()
            .filter(|c| !self.is_demonstrated(*c))
            .collect()
    }
}
