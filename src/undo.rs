//! Undo log for keeper moves
//!
//! Each accepted move is recorded as a single record holding both the
//! direction and the object that was in front of the keeper, so the two
//! halves can never drift out of step.

use crate::core::{Direction, GridObject};
use serde::{Deserialize, Serialize};

/// One reversible keeper move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Direction the keeper moved
    pub direction: Direction,
    /// What occupied the target cell before the move (Floor or Crate)
    pub displaced: GridObject,
}

impl MoveRecord {
    pub fn new(direction: Direction, displaced: GridObject) -> Self {
        MoveRecord {
            direction,
            displaced,
        }
    }

    pub fn pushed_crate(&self) -> bool {
        self.displaced == GridObject::Crate
    }
}

/// Stack of moves made on the current level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoLog {
    /// Stack of moves (most recent at end)
    records: Vec<MoveRecord>,
}

impl UndoLog {
    pub fn new() -> Self {
        UndoLog {
            records: Vec::new(),
        }
    }

    /// Log a move
    pub fn log(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Get the most recent move without removing it
    pub fn peek(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    /// Pop and return the most recent move
    pub fn pop(&mut self) -> Option<MoveRecord> {
        self.records.pop()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clear the entire log
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All records, oldest first
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Directions of every logged move, oldest first
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.records.iter().map(|r| r.direction)
    }

    /// Displaced objects of every logged move, oldest first
    pub fn targets(&self) -> impl Iterator<Item = GridObject> + '_ {
        self.records.iter().map(|r| r.displaced)
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}
