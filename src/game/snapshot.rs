//! Session snapshots for stop-and-resume play
//!
//! Unlike a save file, a snapshot keeps the whole session: every level's
//! live grids (including goals under the keeper, which the text format
//! cannot express), the level cursor, counters and the undo log.

use crate::core::Level;
use crate::game::engine::{EngineConfig, GameEngine};
use crate::undo::UndoLog;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub map_set_name: String,
    pub levels: Vec<Level>,

    /// Index of the level being played; `None` once the game is complete
    pub current_level: Option<usize>,

    pub moves_count: u32,
    pub current_moves: u32,
    /// Accumulated seconds over completed levels
    pub time_count: u64,

    /// Moves made on the current level, oldest first
    pub undo_log: UndoLog,
}

impl SessionSnapshot {
    /// Capture the current state of a session
    pub fn capture(engine: &GameEngine) -> Self {
        SessionSnapshot {
            map_set_name: engine.map_set_name().to_string(),
            levels: engine.levels().to_vec(),
            current_level: engine.current_level().map(|l| l.index()),
            moves_count: engine.moves_count(),
            current_moves: engine.current_moves(),
            time_count: engine.time_count(),
            undo_log: engine.undo_log().clone(),
        }
    }

    /// Rebuild a running session; the level timer restarts from now
    pub fn restore(self, config: EngineConfig) -> Result<GameEngine, SnapshotError> {
        GameEngine::restore(
            self.map_set_name,
            self.levels,
            self.current_level,
            self.moves_count,
            self.current_moves,
            self.time_count,
            self.undo_log,
            config,
        )
        .map_err(|e| SnapshotError::Restore(e.to_string()))
    }

    /// Save snapshot to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| SnapshotError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SnapshotError::Io(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| SnapshotError::Deserialization(e.to_string()))
    }

    pub fn move_count(&self) -> usize {
        self.undo_log.len()
    }
}

/// Errors that can occur during snapshot operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Snapshot does not describe a valid session: {0}")]
    Restore(String),
}

impl From<SnapshotError> for crate::SokobanError {
    fn from(err: SnapshotError) -> Self {
        crate::SokobanError::Serialization(err.to_string())
    }
}
