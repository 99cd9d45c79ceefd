//! Error types for the rules engine.
//!
//! Parse failures are reported to the caller. Out-of-range squares and moves that do not
//! belong to the position are invariant violations and fail fast with a typed error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// A piece letter outside `pnbrqkPNBRQK`
    #[error("unknown piece letter '{0}' in position notation")]
    UnknownPiece(char),

    #[error("malformed piece placement: {0}")]
    BadPlacement(String),

    #[error("malformed {field} field: '{value}'")]
    BadFenField { field: &'static str, value: String },

    #[error("square index {0} out of range (must be 0-63)")]
    SquareOutOfRange(u8),

    #[error("no piece on square {0}")]
    EmptySquare(String),

    /// The move does not fit the position it was applied to
    #[error("invalid move {mv}: {reason}")]
    InvalidMove { mv: String, reason: &'static str },

    #[error("illegal move {0}")]
    IllegalMove(String),

    #[error("expected exactly one {color} king, found {found}")]
    KingCount { color: &'static str, found: u32 },

    #[error("invalid position: {0}")]
    InvalidPosition(&'static str),
}

pub type ChessResult<T> = Result<T, ChessError>;
