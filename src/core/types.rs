//! Coordinates and movement directions
//!
//! Points are `(col, row)` with `row` growing downwards, matching the
//! row-major order in which grids are stored and written to disk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate (may lie outside any grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub col: i32,
    pub row: i32,
}

impl Point {
    pub const fn new(col: i32, row: i32) -> Self {
        Point { col, row }
    }

    /// Offset this point by `delta`. No bounds checking.
    pub const fn translate(self, delta: Point) -> Point {
        Point {
            col: self.col + delta.col,
            row: self.row + delta.row,
        }
    }

    pub const fn negate(self) -> Point {
        Point {
            col: -self.col,
            row: -self.row,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.col, self.row)
    }
}

impl From<Direction> for Point {
    fn from(direction: Direction) -> Self {
        direction.delta()
    }
}

/// One of the four keeper movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit offset for this direction
    pub const fn delta(self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Right => Point::new(1, 0),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
        }
    }

    /// Opposite direction (Up/Down, Left/Right)
    pub const fn inverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_negates_delta() {
        for dir in Direction::ALL {
            assert_eq!(dir.inverse().delta(), dir.delta().negate());
            assert_eq!(dir.inverse().inverse(), dir);
        }
    }

    #[test]
    fn test_translate_ignores_bounds() {
        let p = Point::new(0, 0).translate(Direction::Up.delta());
        assert_eq!(p, Point::new(0, -1));
        assert_eq!(p.translate(Direction::Down.into()), Point::new(0, 0));
    }
}
