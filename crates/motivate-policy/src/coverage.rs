//! MI technique coverage tracking.
//!
//! Each student turn runs through four independent detectors; any number
//! of them may fire on the same turn. Detected flags are OR-ed into the
//! session's [`CoverageState`], which never loses a flag.
//!
//! - **Open-ended question**: a `?`-terminated sentence opening with an
//!   open stem ("what", "how", "could you tell me..."), or an invitation
//!   to elaborate anywhere in the turn ("tell me more about").
//! - **Reflection**: needs a prior patient turn. Fires on a reflective stem
//!   ("it sounds like", "you feel") or on a statement that reuses enough of
//!   the patient's previous wording.
//! - **Autonomy**: language handing the choice to the patient.
//! - **Summary**: a recap stem plus references to several topics the
//!   patient raised earlier.

use std::collections::BTreeSet;

use motivate_core::models::coverage::{CoverageState, TechniqueCategory};
use motivate_core::models::turn::{Role, Turn};
use regex::Regex;
use tracing::debug;

use crate::config::CoverageConfig;
use crate::error::{ConfigurationError, PolicyError};
use crate::session::SessionContext;
use crate::text;

#[derive(Debug, Clone)]
pub struct CoverageTracker {
    open_question: Vec<Regex>,
    open_invitation: Vec<Regex>,
    reflection: Vec<Regex>,
    autonomy: Vec<Regex>,
    summary: Vec<Regex>,
    reflection_min_overlap: usize,
    summary_min_topics: usize,
}

impl CoverageTracker {
    pub fn new(config: &CoverageConfig) -> Result<Self, ConfigurationError> {
        use TechniqueCategory::*;

        Ok(Self {
            open_question: compile(OpenEndedQuestion, &config.open_question_patterns)?,
            open_invitation: compile(OpenEndedQuestion, &config.open_invitation_patterns)?,
            reflection: compile(Reflection, &config.reflection_patterns)?,
            autonomy: compile(Autonomy, &config.autonomy_patterns)?,
            summary: compile(Summary, &config.summary_patterns)?,
            reflection_min_overlap: config.reflection_min_overlap,
            summary_min_topics: config.summary_min_topics,
        })
    }

    /// Append `turn` to the session and fold any techniques it demonstrates
    /// into the session's coverage. Returns the cumulative state.
    ///
    /// Patient turns never set flags; they feed the vocabulary that the
    /// reflection and summary detectors compare against.
    pub fn observe(
        &self,
        session: &mut SessionContext,
        turn: Turn,
    ) -> Result<CoverageState, PolicyError> {
        let detected = match turn.role {
            Role::Student => {
                let previous_patient = session.last_turn(Role::Patient).map(|t| t.text.as_str());
                self.detect(&turn.text, previous_patient, session.patient_vocabulary())
            }
            Role::Patient => CoverageState::default(),
        };

        let sequence_index = turn.sequence_index;
        session.append(turn)?;
        let state = session.merge_coverage(detected);

        debug!(
            session_id = %session.id(),
            sequence_index,
            detected = ?detected,
            complete = state.is_complete(),
            "coverage observed"
        );

        Ok(state)
    }

    /// Run all four detectors over one student utterance.
    ///
    /// `previous_patient` is the patient's latest turn before this one;
    /// `patient_vocabulary` holds topic words from every earlier patient turn.
    pub fn detect(
        &self,
        student_text: &str,
        previous_patient: Option<&str>,
        patient_vocabulary: &BTreeSet<String>,
    ) -> CoverageState {
        let sentences = text::sentences(student_text);
        let normalized = text::normalize(student_text);
        let mut state = CoverageState::default();

        if self.is_open_ended(&sentences) {
            state.mark(TechniqueCategory::OpenEndedQuestion);
        }
        if let Some(patient) = previous_patient
            && self.is_reflection(student_text, &normalized, patient)
        {
            state.mark(TechniqueCategory::Reflection);
        }
        if any_match(&self.autonomy, &normalized) {
            state.mark(TechniqueCategory::Autonomy);
        }
        if self.is_summary(student_text, &normalized, patient_vocabulary) {
            state.mark(TechniqueCategory::Summary);
        }

        state
    }

    pub fn is_complete(state: &CoverageState) -> bool {
        state.is_complete()
    }

    /// Undemonstrated categories in the fixed reporting order.
    pub fn missing(state: &CoverageState) -> Vec<TechniqueCategory> {
        state.missing()
    }

    fn is_open_ended(&self, sentences: &[(String, bool)]) -> bool {
        sentences.iter().any(|(sentence, is_question)| {
            (*is_question && any_match(&self.open_question, sentence))
                || any_match(&self.open_invitation, sentence)
        })
    }

    fn is_reflection(&self, raw: &str, normalized: &str, previous_patient: &str) -> bool {
        if any_match(&self.reflection, normalized) {
            return true;
        }
        if self.reflection_min_overlap == 0 || raw.trim_end().ends_with('?') {
            return false;
        }
        let patient_words = text::content_words(previous_patient);
        let shared = text::content_words(raw)
            .intersection(&patient_words)
            .count();
        shared >= self.reflection_min_overlap
    }

    fn is_summary(&self, raw: &str, normalized: &str, vocabulary: &BTreeSet<String>) -> bool {
        if !any_match(&self.summary, normalized) {
            return false;
        }
        let topics = text::content_words(raw)
            .intersection(vocabulary)
            .count();
        topics >= self.summary_min_topics
    }
}

fn compile(
    category: TechniqueCategory,
    patterns: &[String],
) -> Result<Vec<Regex>, ConfigurationError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigurationError::InvalidPattern {
                category,
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}
