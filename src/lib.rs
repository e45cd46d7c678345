//! Sokoban puzzle engine
//!
//! Grid-based levels, the move/undo state machine, the `.skb` save format
//! and per-level score ledgers. Drawing and input capture are left to the
//! caller; `game::interactive` provides a plain text front-end.

pub mod core;
pub mod error;
pub mod game;
pub mod profile;
pub mod savefile;
pub mod score;
pub mod undo;

pub use error::{Result, SokobanError};
