//! SKB save file parser
//!
//! Line-oriented: `MapSetName:` names the session, each `LevelName:` starts
//! a new level, and every other line is a candidate grid row. A row is
//! only kept when it holds at least two wall symbols, which drops blank and
//! decorative lines but would also drop a legitimately wall-light row.

use crate::core::{GridObject, Level};
use crate::game::GameLogger;
use crate::savefile::SaveFile;
use std::io::BufRead;

pub const MAP_SET_MARKER: &str = "MapSetName";
pub const LEVEL_MARKER: &str = "LevelName";

/// Minimum wall symbols for a line to count as a level row
const MIN_ROW_WALLS: usize = 2;

/// Accumulates rows between level markers
struct LevelCollector<'a> {
    levels: Vec<Level>,
    pending_name: String,
    pending_rows: Vec<String>,
    seen_marker: bool,
    logger: &'a GameLogger,
}

impl<'a> LevelCollector<'a> {
    fn new(logger: &'a GameLogger) -> Self {
        LevelCollector {
            levels: Vec::new(),
            pending_name: String::new(),
            pending_rows: Vec::new(),
            seen_marker: false,
            logger,
        }
    }

    /// Turn the pending rows into a level under the next free index
    fn flush(&mut self) {
        if self.pending_rows.is_empty() {
            if self.seen_marker {
                self.logger.warning(
                    "load",
                    &format!("skipping level '{}': no grid rows", self.pending_name),
                );
            }
            return;
        }

        let rows = std::mem::take(&mut self.pending_rows);
        let index = self.levels.len();
        match Level::new(self.pending_name.clone(), index, &rows) {
            Ok(level) => {
                if level.is_ragged() {
                    self.logger.warning(
                        "load",
                        &format!(
                            "level '{}' has rows of inconsistent width; using {} columns",
                            level.name(),
                            level.columns()
                        ),
                    );
                }
                self.logger.event(
                    crate::game::VerbosityLevel::Verbose,
                    "load",
                    format_args!("[ADDING LEVEL] LEVEL [{}]: {}", index, level.name()),
                );
                self.levels.push(level);
            }
            Err(e) => {
                self.logger.warning(
                    "load",
                    &format!("skipping level '{}': {}", self.pending_name, e),
                );
            }
        }
    }

    fn start_level(&mut self, name: String) {
        if self.seen_marker {
            self.flush();
        } else {
            // Rows seen before the first marker stay with the first level
            self.seen_marker = true;
        }
        self.pending_name = name;
    }
}

/// Text after `marker:` on a marker line, trimmed
fn marker_value(line: &str, marker: &str) -> String {
    let rest = match line.find(marker) {
        Some(pos) => &line[pos + marker.len()..],
        None => line,
    };
    rest.strip_prefix(':').unwrap_or(rest).trim().to_string()
}

/// Normalize a candidate row; `None` if it fails the wall heuristic
pub fn normalize_row(line: &str) -> Option<String> {
    let row = line.trim().to_uppercase();
    let walls = row
        .chars()
        .filter(|c| *c == GridObject::Wall.symbol())
        .count();
    (walls >= MIN_ROW_WALLS).then_some(row)
}

/// Parse a save file from a reader, best-effort
///
/// A read error part-way through (including invalid UTF-8) is logged and
/// whatever was parsed up to that point is returned.
pub fn parse_reader<R: BufRead>(reader: R, logger: &GameLogger) -> SaveFile {
    let mut map_set_name: Option<String> = None;
    let mut collector = LevelCollector::new(logger);

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                logger.severe("load", &format!("Error trying to load the game file: {e}"));
                break;
            }
        };

        if line.contains(MAP_SET_MARKER) {
            if map_set_name.is_none() {
                map_set_name = Some(marker_value(&line, MAP_SET_MARKER));
            }
            continue;
        }

        if line.contains(LEVEL_MARKER) {
            collector.start_level(marker_value(&line, LEVEL_MARKER));
            continue;
        }

        if let Some(row) = normalize_row(&line) {
            collector.pending_rows.push(row);
        }
    }

    collector.flush();

    SaveFile {
        map_set_name: map_set_name.unwrap_or_default(),
        levels: collector.levels,
    }
}

/// Parse a save file from string contents
pub fn parse_save(contents: &str, logger: &GameLogger) -> SaveFile {
    parse_reader(contents.as_bytes(), logger)
}
