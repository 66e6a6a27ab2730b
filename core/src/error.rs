use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must be at least 1x1")]
    EmptyBoard,
    #[error("Generated board does not match the configured size or mine count")]
    InvalidBoardShape,
    #[error("Not enough room for {requested} mines, only {available} cells outside the safe zone")]
    InsufficientSpace {
        requested: CellCount,
        available: CellCount,
    },
    #[error("Initials must contain at least one character")]
    InvalidInitials,
    #[error("Unknown difficulty, expected easy, medium or hard")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;
