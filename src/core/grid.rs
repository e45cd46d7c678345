//! Fixed-size 2D grid of tiles

use crate::core::{GridObject, Point};
use crate::{Result, SokobanError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense `columns x rows` array of optional tiles, stored row-major
///
/// An absent cell is a cell nothing was ever written to (for example the
/// tail of a short row in a save file). It renders as the debug filler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<Option<GridObject>>,
}

impl Grid {
    /// Create a grid with every cell absent
    pub fn new(columns: usize, rows: usize) -> Self {
        Grid {
            columns,
            rows,
            cells: vec![None; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Offset `source` by `delta` (pure arithmetic, callers check bounds)
    pub fn translate_point(source: Point, delta: Point) -> Point {
        source.translate(delta)
    }

    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.columns && (row as usize) < self.rows
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if self.contains(col, row) {
            Some(row as usize * self.columns + col as usize)
        } else {
            None
        }
    }

    /// Get the tile at `(col, row)`
    pub fn get(&self, col: i32, row: i32) -> Result<Option<GridObject>> {
        self.index(col, row)
            .map(|i| self.cells[i])
            .ok_or(SokobanError::OutOfBounds { col, row })
    }

    pub fn get_at(&self, p: Point) -> Result<Option<GridObject>> {
        self.get(p.col, p.row)
    }

    /// Tile at `source + delta`
    pub fn target_from_source(&self, source: Point, delta: Point) -> Result<Option<GridObject>> {
        self.get_at(source.translate(delta))
    }

    /// Write `obj` into `(col, row)`. Returns false without mutating when out of bounds.
    pub fn put(&mut self, obj: Option<GridObject>, col: i32, row: i32) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.cells[i] = obj;
                true
            }
            None => false,
        }
    }

    pub fn put_at(&mut self, obj: Option<GridObject>, p: Point) -> bool {
        self.put(obj, p.col, p.row)
    }

    /// Clear a cell back to absent
    pub fn remove_at(&mut self, p: Point) -> bool {
        self.put_at(None, p)
    }

    /// Row-major iteration, column fastest
    pub fn iter(&self) -> impl Iterator<Item = (Point, Option<GridObject>)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let p = Point::new((i % columns) as i32, (i / columns) as i32);
            (p, *cell)
        })
    }

    /// Number of cells holding exactly `obj`
    pub fn count(&self, obj: GridObject) -> usize {
        self.cells.iter().filter(|c| **c == Some(obj)).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", GridObject::symbol_or_filler(*cell))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_out_of_bounds() {
        let grid = Grid::new(3, 2);
        assert!(grid.get(2, 1).is_ok());
        assert!(matches!(
            grid.get(3, 0),
            Err(SokobanError::OutOfBounds { col: 3, row: 0 })
        ));
        assert!(grid.get(0, 2).is_err());
        assert!(grid.get(-1, 0).is_err());
        assert!(grid.get(0, -1).is_err());
    }

    #[test]
    fn test_put_out_of_bounds_does_not_mutate() {
        let mut grid = Grid::new(2, 2);
        let before = grid.clone();
        assert!(!grid.put(Some(GridObject::Wall), 2, 0));
        assert!(!grid.put(Some(GridObject::Wall), 0, -1));
        assert_eq!(grid, before);

        assert!(grid.put(Some(GridObject::Crate), 1, 1));
        assert_eq!(grid.get(1, 1).unwrap(), Some(GridObject::Crate));
    }

    #[test]
    fn test_remove_clears_cell() {
        let mut grid = Grid::new(1, 1);
        grid.put(Some(GridObject::Floor), 0, 0);
        assert!(grid.remove_at(Point::new(0, 0)));
        assert_eq!(grid.get(0, 0).unwrap(), None);
    }

    #[test]
    fn test_display_row_major_with_filler() {
        let mut grid = Grid::new(3, 2);
        grid.put(Some(GridObject::Wall), 0, 0);
        grid.put(Some(GridObject::Keeper), 1, 0);
        grid.put(Some(GridObject::Wall), 2, 0);
        grid.put(Some(GridObject::Crate), 0, 1);
        grid.put(Some(GridObject::Floor), 1, 1);
        // (2, 1) left absent
        assert_eq!(grid.to_string(), "WSW\nC =\n");
    }

    #[test]
    fn test_iteration_order() {
        let grid = Grid::new(2, 2);
        let points: Vec<Point> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(
            points,
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(1, 1)
            ]
        );
    }
}
