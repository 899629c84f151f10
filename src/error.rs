//! Error types shared by the rules engine, the game store and the session
//! coordinator.

/// Failures surfaced to a client as an ERROR message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No piece on the start square, wrong side to move, or a move outside
    /// the legal set.
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// Unparseable move text, out-of-range square or bad action envelope.
    #[error("Malformed action: {0}")]
    MalformedAction(String),

    /// Unknown game id.
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
