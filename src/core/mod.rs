//! Core level data model: tiles, grids and levels

pub mod grid;
pub mod level;
pub mod object;
pub mod types;

pub use grid::Grid;
pub use level::Level;
pub use object::GridObject;
pub use types::{Direction, Point};
