//! Game session state, front-end and logging

pub mod engine;
pub mod interactive;
pub mod logger;
pub mod snapshot;

pub use engine::{
    CounterSnapshot, EngineConfig, GameEngine, KeyInput, LevelCompletion, MoveOutcome,
    SessionState,
};
pub use interactive::{Command, InteractiveSession};
pub use logger::{GameLogger, LogEntry, OutputMode, Severity, VerbosityLevel};
pub use snapshot::{SessionSnapshot, SnapshotError};
