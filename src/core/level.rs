//! A single puzzle level: object grid plus goal overlay

use crate::core::{Grid, GridObject, Point};
use crate::{Result, SokobanError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, indexed level
///
/// The object grid never stores `Diamond` directly. Goal cells live in the
/// overlay and are merged back in only by the composed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    name: String,
    index: usize,
    objects: Grid,
    diamonds: Grid,
    diamond_count: usize,
    keeper_position: Point,
    /// Set when some row's width disagreed with the first row
    ragged: bool,
}

impl Level {
    /// Build a level from its raw rows
    ///
    /// Dimensions come from the row count and the trimmed width of the
    /// first row. Characters past that width are dropped; short rows leave
    /// absent cells.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        index: usize,
        raw_rows: &[S],
    ) -> Result<Self> {
        let name = name.into();
        let first = raw_rows.first().ok_or_else(|| {
            SokobanError::MalformedSave(format!("level '{name}' has no rows"))
        })?;

        let rows = raw_rows.len();
        let columns = first.as_ref().trim().chars().count();

        let mut objects = Grid::new(columns, rows);
        let mut diamonds = Grid::new(columns, rows);
        let mut diamond_count = 0;
        let mut keepers = Vec::with_capacity(1);
        let mut ragged = false;

        for (row, raw) in raw_rows.iter().enumerate() {
            let raw = raw.as_ref();
            if raw.chars().count() != columns {
                ragged = true;
            }

            for (col, c) in raw.chars().enumerate() {
                let p = Point::new(col as i32, row as i32);
                let tile = match GridObject::from_symbol(c) {
                    GridObject::Diamond => {
                        if diamonds.put_at(Some(GridObject::Diamond), p) {
                            diamond_count += 1;
                        }
                        Some(GridObject::Floor)
                    }
                    GridObject::CrateOnDiamond => {
                        if diamonds.put_at(Some(GridObject::Diamond), p) {
                            diamond_count += 1;
                        }
                        Some(GridObject::Crate)
                    }
                    GridObject::Keeper => {
                        if objects.contains(p.col, p.row) {
                            keepers.push(p);
                        }
                        Some(GridObject::Keeper)
                    }
                    GridObject::Unknown => None,
                    other => Some(other),
                };
                objects.put_at(tile, p);
            }
        }

        let keeper_position = match keepers.as_slice() {
            [p] => *p,
            [] => {
                return Err(SokobanError::MalformedSave(format!(
                    "level '{name}' has no keeper"
                )))
            }
            _ => {
                return Err(SokobanError::MalformedSave(format!(
                    "level '{name}' has {} keepers",
                    keepers.len()
                )))
            }
        };

        Ok(Level {
            name,
            index,
            objects,
            diamonds,
            diamond_count,
            keeper_position,
            ragged,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn keeper_position(&self) -> Point {
        self.keeper_position
    }

    pub(crate) fn set_keeper_position(&mut self, p: Point) {
        self.keeper_position = p;
    }

    pub fn diamond_count(&self) -> usize {
        self.diamond_count
    }

    /// True when some row did not match the first row's width
    pub fn is_ragged(&self) -> bool {
        self.ragged
    }

    pub fn columns(&self) -> usize {
        self.objects.columns()
    }

    pub fn rows(&self) -> usize {
        self.objects.rows()
    }

    /// Live object grid (read-only view)
    pub fn objects_grid(&self) -> &Grid {
        &self.objects
    }

    /// Goal overlay (read-only, fixed after load)
    pub fn diamonds_grid(&self) -> &Grid {
        &self.diamonds
    }

    pub fn object_at(&self, p: Point) -> Result<Option<GridObject>> {
        self.objects.get_at(p)
    }

    pub fn target_object(&self, source: Point, delta: Point) -> Result<Option<GridObject>> {
        self.objects.target_from_source(source, delta)
    }

    pub fn move_object_by(&mut self, obj: GridObject, source: Point, delta: Point) -> Result<()> {
        self.move_object_to(obj, source, source.translate(delta))
    }

    /// Move `obj` into `destination`, writing the displaced occupant back into `source`
    pub fn move_object_to(
        &mut self,
        obj: GridObject,
        source: Point,
        destination: Point,
    ) -> Result<()> {
        let displaced = self.objects.get_at(destination)?;
        if !self.objects.contains(source.col, source.row) {
            return Err(SokobanError::OutOfBounds {
                col: source.col,
                row: source.row,
            });
        }
        self.objects.put_at(displaced, source);
        self.objects.put_at(Some(obj), destination);
        Ok(())
    }

    /// Number of goal cells currently covered by a crate
    pub fn crates_on_diamonds(&self) -> usize {
        self.objects
            .iter()
            .zip(self.diamonds.iter())
            .filter(|((_, obj), (_, goal))| {
                *obj == Some(GridObject::Crate) && *goal == Some(GridObject::Diamond)
            })
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.crates_on_diamonds() >= self.diamond_count
    }

    /// Object grid value with the goal overlay merged in
    pub fn compose_cell(&self, col: i32, row: i32) -> Result<Option<GridObject>> {
        let object = self.objects.get(col, row)?;
        let goal = self.diamonds.get(col, row)?;
        Ok(compose(object, goal))
    }

    /// Lazy composed view, row-major
    pub fn composed(&self) -> impl Iterator<Item = (Point, Option<GridObject>)> + '_ {
        self.objects
            .iter()
            .zip(self.diamonds.iter())
            .map(|((p, object), (_, goal))| (p, compose(object, goal)))
    }

    /// Copy of the composed view, detached from the live grid
    pub fn composed_grid(&self) -> Grid {
        let mut grid = Grid::new(self.columns(), self.rows());
        for (p, obj) in self.composed() {
            grid.put_at(obj, p);
        }
        grid
    }
}

/// Keeper and walls override the goal visual; crates and floors pick it up
fn compose(object: Option<GridObject>, goal: Option<GridObject>) -> Option<GridObject> {
    if goal != Some(GridObject::Diamond) {
        return object;
    }
    match object {
        Some(GridObject::Crate) => Some(GridObject::CrateOnDiamond),
        Some(GridObject::Floor) => Some(GridObject::Diamond),
        other => other,
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.composed_grid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Level {
        Level::new("Sample", 0, &["WWWWWWW", "WS C DW", "W     W", "WWWWWWW"])
        .unwrap()
    }

    #[test]
    fn test_construction_splits_diamonds() {
        let level = sample();
        assert_eq!(level.name(), "Sample");
        assert_eq!(level.index(), 0);
        assert_eq!(level.columns(), 7);
        assert_eq!(level.rows(), 4);
        assert_eq!(level.diamond_count(), 1);
        assert_eq!(level.keeper_position(), Point::new(1, 1));
        // Object grid never holds diamonds
        assert_eq!(level.objects_grid().count(GridObject::Diamond), 0);
        assert_eq!(
            level.object_at(Point::new(5, 1)).unwrap(),
            Some(GridObject::Floor)
        );
        assert_eq!(
            level.diamonds_grid().get(5, 1).unwrap(),
            Some(GridObject::Diamond)
        );
    }

    #[test]
    fn test_lowercase_rows() {
        let level = Level::new("lower", 3, &["wwww", "wscw", "wddw", "wwww"]).unwrap();
        assert_eq!(level.diamond_count(), 2);
        assert_eq!(
            level.object_at(Point::new(2, 1)).unwrap(),
            Some(GridObject::Crate)
        );
    }

    #[test]
    fn test_crate_on_diamond_symbol_splits() {
        let level = Level::new("placed", 0, &["WWWW", "WSOW", "WWWW"]).unwrap();
        assert_eq!(level.diamond_count(), 1);
        assert_eq!(
            level.object_at(Point::new(2, 1)).unwrap(),
            Some(GridObject::Crate)
        );
        assert!(level.is_complete());
    }

    #[test]
    fn test_missing_keeper_rejected() {
        let err = Level::new("empty", 0, &["WWW", "W W", "WWW"]).unwrap_err();
        assert!(matches!(err, SokobanError::MalformedSave(_)));
    }

    #[test]
    fn test_two_keepers_rejected() {
        assert!(Level::new("twins", 0, &["WWWW", "WSSW", "WWWW"]).is_err());
    }

    #[test]
    fn test_no_rows_rejected() {
        let rows: [&str; 0] = [];
        assert!(Level::new("none", 0, &rows).is_err());
    }

    #[test]
    fn test_ragged_rows() {
        let level = Level::new("ragged", 0, &["WWWW", "WS DW", "WW"]).unwrap();
        assert!(level.is_ragged());
        assert_eq!(level.columns(), 4);
        // Long row is truncated: the trailing W is dropped, diamond kept
        assert_eq!(level.diamond_count(), 1);
        // Short row leaves absent cells
        assert_eq!(level.object_at(Point::new(3, 2)).unwrap(), None);
        assert_eq!(level.to_string(), "WWWW\nWS D\nWW==\n");
    }

    #[test]
    fn test_move_object_swaps_occupant() {
        let mut level = sample();
        let keeper = Point::new(1, 1);
        level
            .move_object_by(GridObject::Keeper, keeper, Point::new(1, 0))
            .unwrap();
        assert_eq!(level.object_at(keeper).unwrap(), Some(GridObject::Floor));
        assert_eq!(
            level.object_at(Point::new(2, 1)).unwrap(),
            Some(GridObject::Keeper)
        );
    }

    #[test]
    fn test_move_object_out_of_bounds() {
        let mut level = sample();
        let before = level.clone();
        let result = level.move_object_by(GridObject::Keeper, Point::new(0, 0), Point::new(-1, 0));
        assert!(matches!(result, Err(SokobanError::OutOfBounds { .. })));
        assert_eq!(level, before);
    }

    #[test]
    fn test_completion_is_recomputed() {
        let mut level = sample();
        assert!(!level.is_complete());

        level
            .move_object_to(GridObject::Crate, Point::new(3, 1), Point::new(5, 1))
            .unwrap();
        assert!(level.is_complete());

        level
            .move_object_to(GridObject::Crate, Point::new(5, 1), Point::new(5, 2))
            .unwrap();
        assert!(!level.is_complete());
    }

    #[test]
    fn test_composed_view() {
        let mut level = sample();
        assert_eq!(level.compose_cell(5, 1).unwrap(), Some(GridObject::Diamond));
        assert_eq!(level.compose_cell(3, 1).unwrap(), Some(GridObject::Crate));

        level
            .move_object_to(GridObject::Crate, Point::new(3, 1), Point::new(5, 1))
            .unwrap();
        assert_eq!(
            level.compose_cell(5, 1).unwrap(),
            Some(GridObject::CrateOnDiamond)
        );

        level
            .move_object_to(GridObject::Keeper, Point::new(1, 1), Point::new(5, 1))
            .unwrap();
        // Keeper overrides the goal visual
        assert_eq!(level.compose_cell(5, 1).unwrap(), Some(GridObject::Keeper));
    }

    #[test]
    fn test_composed_iterator_matches_compose_cell() {
        let level = sample();
        for (p, obj) in level.composed() {
            assert_eq!(level.compose_cell(p.col, p.row).unwrap(), obj);
        }
        assert_eq!(level.to_string(), "WWWWWWW\nWS C DW\nW     W\nWWWWWWW\n");
    }
}
