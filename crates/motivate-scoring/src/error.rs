use motivate_core::models::rubric::RubricVersion;
use thiserror::Error;

/// Feedback text that could not be turned into rubric categories.
#[derive(Debug, Error)]
pub enum RubricParseError {
    #[error("feedback text is empty")]
    EmptyFeedback,

    #[error("no {version} rubric categories recognized in {lines_scanned} lines of feedback")]
    NoCategories {
        version: RubricVersion,
        lines_scanned: usize,
    },

    #[error("invalid point value '{value}' for category '{category}'")]
    InvalidPoints { category: String, value: String },
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Parse(#[from] RubricParseError),

    #[error("invalid band table: {0}")]
    InvalidBandTable(String),

    #[error("invalid modifier table: {0}")]
    InvalidModifierTable(String),

    #[error("invalid rubric setting: {0}")]
    InvalidRubric(String),
}
