//! Per-level score ledgers
//!
//! Each level has a plain text file `level<index>.txt` in the scores
//! directory. Lines are `name\t\tmoves\t\tseconds`, sorted by seconds then
//! moves, and the file ends with one blank line. Reading stops at the first
//! blank line.

use crate::{Result, SokobanError};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// How many entries the leaderboard shows
pub const TOP_TEN: usize = 10;

const FIELD_SEPARATOR: &str = "\t\t";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub moves: u32,
    pub seconds: u64,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, moves: u32, seconds: u64) -> Self {
        ScoreEntry {
            name: name.into(),
            moves,
            seconds,
        }
    }

    /// Sort key: fastest first, fewer moves breaks ties
    fn rank(&self) -> (u64, u32) {
        (self.seconds, self.moves)
    }

    /// Parse one ledger line; the last two whitespace-separated fields are
    /// moves and seconds, everything before them is the name
    pub fn parse_line(line: &str) -> Result<Self> {
        let bad = || SokobanError::ParseError(format!("malformed score line: {line:?}"));

        let (head, seconds) = line
            .trim_end()
            .rsplit_once(char::is_whitespace)
            .ok_or_else(bad)?;
        let head = head.trim_end();
        let (name, moves) = match head.rsplit_once(char::is_whitespace) {
            Some((name, moves)) => (name.trim(), moves),
            None => ("", head),
        };

        Ok(ScoreEntry {
            name: name.to_string(),
            moves: moves.parse().map_err(|_| bad())?,
            seconds: seconds.parse().map_err(|_| bad())?,
        })
    }
}

impl std::fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.name, self.moves, self.seconds
        )
    }
}

/// Sorted entries for one level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    entries: Vec<ScoreEntry>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        ScoreLedger::default()
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let entries = contents
            .lines()
            .take_while(|line| !line.trim().is_empty())
            .map(ScoreEntry::parse_line)
            .collect::<Result<Vec<_>>>()?;
        Ok(ScoreLedger { entries })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{entry}");
        }
        out.push('\n');
        out
    }

    /// Insert before the first entry that ranks strictly worse; returns the position
    pub fn insert(&mut self, entry: ScoreEntry) -> usize {
        let position = self
            .entries
            .iter()
            .position(|existing| existing.rank() > entry.rank())
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        position
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn top_n(&self, n: usize) -> &[ScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leaderboard text for the level-complete and high-score dialogs
    pub fn display_table(&self, n: usize) -> String {
        if self.entries.is_empty() {
            return "No Records".to_string();
        }
        let mut out = String::from("Top 10 for this level\n\nName\tMoves\tTime\n\n");
        for entry in self.top_n(n) {
            let _ = writeln!(out, "{entry}");
        }
        out
    }
}

/// Directory of ledgers, cached after first read
#[derive(Debug)]
pub struct ScoreStore {
    dir: PathBuf,
    cache: FxHashMap<usize, ScoreLedger>,
}

impl ScoreStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ScoreStore {
            dir: dir.into(),
            cache: FxHashMap::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ledger_path(&self, level: usize) -> PathBuf {
        self.dir.join(format!("level{level}.txt"))
    }

    /// Ledger for a level; a missing file is an empty ledger
    pub fn ledger(&mut self, level: usize) -> Result<&ScoreLedger> {
        let path = self.ledger_path(level);
        match self.cache.entry(level) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(read_ledger(&path)?)),
        }
    }

    /// Add a result and rewrite the ledger file; returns the insert position
    pub fn record(&mut self, level: usize, name: &str, moves: u32, seconds: u64) -> Result<usize> {
        // Another session may have written since we cached
        let mut ledger = read_ledger(&self.ledger_path(level))?;
        let position = ledger.insert(ScoreEntry::new(name, moves, seconds));

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.ledger_path(level), ledger.render())?;
        self.cache.insert(level, ledger);
        Ok(position)
    }

    pub fn top_n(&mut self, level: usize, n: usize) -> Result<Vec<ScoreEntry>> {
        Ok(self.ledger(level)?.top_n(n).to_vec())
    }

    pub fn display_table(&mut self, level: usize) -> Result<String> {
        Ok(self.ledger(level)?.display_table(TOP_TEN))
    }
}

fn read_ledger(path: &Path) -> Result<ScoreLedger> {
    match std::fs::read_to_string(path) {
        Ok(contents) => ScoreLedger::parse(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ScoreLedger::new()),
        Err(e) => Err(e.into()),
    }
}
