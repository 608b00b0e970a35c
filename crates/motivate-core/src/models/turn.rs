use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Who produced a turn in a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    /// The trainee practising MI.
    Student,
    /// The simulated patient (the conversational model's side).
    Patient,
}

/// One message in a practice transcript.
///
/// `sequence_index` starts at 1 and increases strictly across the session.
/// A turn is never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub sequence_index: u32,
    /// When the message was sent, if the caller measured it. Used only to
    /// derive response latency for the timing modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub sent_at: Option<jiff::Timestamp>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>, sequence_index: u32) -> Self {
        Self {
            role,
            text: text.into(),
            sequence_index,
            sent_at: None,
        }
    }

    pub fn student(text: impl Into<String>, sequence_index: u32) -> Self {
        Self::new(Role::Student, text, sequence_index)
    }

    pub fn patient(text: impl Into<String>, sequence_index: u32) -> Self {
        Self::new(Role::Patient, text, sequence_index)
    }

    #[must_use]
    pub fn sent_at(mut self, at: jiff::Timestamp) -> Self {
        self.sent_at = Some(at);
        self
    }
}
