//! Tile kinds and their save-file symbols

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every kind of tile that can occupy a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridObject {
    /// Blocks both the keeper and crates
    Wall,
    /// Walkable empty cell
    Floor,
    /// Pushable tile
    Crate,
    /// Goal cell (only ever stored in the goal overlay)
    Diamond,
    /// The player-controlled tile
    Keeper,
    /// Composed view of a crate standing on a goal
    CrateOnDiamond,
    /// Debug filler, also used when rendering absent cells
    Unknown,
}

impl GridObject {
    /// All variants, in symbol-table order
    pub const ALL: [GridObject; 7] = [
        GridObject::Wall,
        GridObject::Floor,
        GridObject::Crate,
        GridObject::Diamond,
        GridObject::Keeper,
        GridObject::CrateOnDiamond,
        GridObject::Unknown,
    ];

    /// Canonical save-file symbol
    pub const fn symbol(self) -> char {
        match self {
            GridObject::Wall => 'W',
            GridObject::Floor => ' ',
            GridObject::Crate => 'C',
            GridObject::Diamond => 'D',
            GridObject::Keeper => 'S',
            GridObject::CrateOnDiamond => 'O',
            GridObject::Unknown => '=',
        }
    }

    /// Parse a symbol, ignoring case
    ///
    /// Unrecognized characters fall back to `Wall` so a damaged save file
    /// still loads into an enclosed level.
    pub fn from_symbol(c: char) -> GridObject {
        match c.to_ascii_uppercase() {
            'W' => GridObject::Wall,
            ' ' => GridObject::Floor,
            'C' => GridObject::Crate,
            'D' => GridObject::Diamond,
            'S' => GridObject::Keeper,
            'O' => GridObject::CrateOnDiamond,
            '=' => GridObject::Unknown,
            _ => GridObject::Wall,
        }
    }

    /// Symbol for a possibly-absent cell
    pub fn symbol_or_filler(cell: Option<GridObject>) -> char {
        cell.unwrap_or(GridObject::Unknown).symbol()
    }
}

impl fmt::Display for GridObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GridObject::Wall => "WALL",
            GridObject::Floor => "FLOOR",
            GridObject::Crate => "CRATE",
            GridObject::Diamond => "DIAMOND",
            GridObject::Keeper => "KEEPER",
            GridObject::CrateOnDiamond => "CRATE_ON_DIAMOND",
            GridObject::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}
