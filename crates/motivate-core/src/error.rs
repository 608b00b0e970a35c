use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("turn sequence index must increase: previous {previous}, got {got}")]
    OutOfOrderTurn { previous: u32, got: u32 },

    #[error("turn sequence index must start at 1, got 0")]
    ZeroSequenceIndex,
}
