//! Error types for the Sokoban engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SokobanError {
    #[error("The point [{col}:{row}] is outside the map")]
    OutOfBounds { col: i32, row: i32 },

    #[error("Malformed save file: {0}")]
    MalformedSave(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SokobanError>;
