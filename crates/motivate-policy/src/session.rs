use std::collections::BTreeSet;

use motivate_core::error::CoreError;
use motivate_core::models::coverage::CoverageState;
use motivate_core::models::turn::{Role, Turn};
use uuid::Uuid;

use crate::text;

/// Per-session state owned by the caller and threaded through every
/// [`CoverageTracker`](crate::coverage::CoverageTracker) and
/// [`EndGate`](crate::gate::EndGate) call.
///
/// Nothing here is shared between sessions. The transcript and trace only
/// grow; coverage flags are only ever set.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: Uuid,
    transcript: Vec<Turn>,
    coverage: CoverageState,
    patient_vocabulary: BTreeSet<String>,
    trace: Vec<String>,
    evaluations: u32,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            transcript: Vec::new(),
            coverage: CoverageState::default(),
            patient_vocabulary: BTreeSet::new(),
            trace: Vec::new(),
            evaluations: 0,
        }
    }

    /// Rebuild a session from a stored transcript and the coverage that was
    /// recorded for it, e.g. after the chat UI reloads.
    pub fn restore(
        id: Uuid,
        transcript: Vec<Turn>,
        coverage: CoverageState,
    ) -> Result<Self, CoreError> {
        let mut session = Self::with_id(id);
        for turn in transcript {
            session.append(turn)?;
        }
        session.coverage = coverage;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn coverage(&self) -> CoverageState {
        self.coverage
    }

    /// Every gate check performed in this session, oldest first.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Sequence index of the latest turn, or 0 before the first turn.
    pub fn turn_count(&self) -> u32 {
        self.transcript.last().map_or(0, |t| t.sequence_index)
    }

    /// The most recent turn by `role`, if any.
    pub fn last_turn(&self, role: Role) -> Option<&Turn> {
        self.transcript.iter().rev().find(|t| t.role == role)
    }

    pub(crate) fn patient_vocabulary(&self) -> &BTreeSet<String> {
        &self.patient_vocabulary
    }

    pub(crate) fn merge_coverage(&mut self, detected: CoverageState) -> CoverageState {
        self.coverage.merge(detected);
        self.coverage
    }

    /// Append a turn, enforcing a strictly increasing sequence index that
    /// starts at 1.
    pub(crate) fn append(&mut self, turn: Turn) -> Result<(), CoreError> {
        if turn.sequence_index == 0 {
            return Err(CoreError::ZeroSequenceIndex);
        }
        let previous = self.turn_count();
        if turn.sequence_index <= previous {
            return Err(CoreError::OutOfOrderTurn {
                previous,
                got: turn.sequence_index,
            });
        }

        if turn.role == Role::Patient {
            self.patient_vocabulary
                .extend(text::content_words(&turn.text));
        }
        self.transcript.push(turn);
        Ok(())
    }

    pub(crate) fn begin_evaluation(&mut self) -> u32 {
        self.evaluations += 1;
        self.evaluations
    }

    pub(crate) fn push_trace(&mut self, entry: String) {
        self.trace.push(entry);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
