use motivate_core::error::CoreError;
use motivate_core::models::coverage::TechniqueCategory;
use thiserror::Error;

use crate::phrase::PhraseKind;

/// Invalid policy configuration, detected when a matcher or tracker is built.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{kind} phrase list contains an empty phrase: {phrase:?}")]
    EmptyPhrase { kind: PhraseKind, phrase: String },

    #[error("confirmation phrase '{phrase}' can occur inside an utterance made only of ambiguous phrases")]
    OverlappingPhrase { phrase: String },

    #[error("end token must not be empty")]
    EmptyEndToken,

    #[error("invalid {category} pattern '{pattern}': {message}")]
    InvalidPattern {
        category: TechniqueCategory,
        pattern: String,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
