//! Save file support
//!
//! This module provides parsing and writing for .skb (save) files, which
//! hold an ordered set of levels together with the map set name.

pub mod discover;
pub mod format;
pub mod writer;

pub use discover::{scan_directory, SaveSummary};
pub use format::{parse_reader, parse_save};
pub use writer::{render_save, write_save};

use crate::core::Level;
use crate::game::GameLogger;
use crate::Result;
use std::io::BufReader;
use std::path::Path;

/// A parsed save file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveFile {
    pub map_set_name: String,
    pub levels: Vec<Level>,
}

impl SaveFile {
    /// Load a save file from disk
    ///
    /// Failing to open the file is an error; problems inside the file are
    /// logged and produce a shorter level list.
    pub fn load(path: &Path, logger: &GameLogger) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(format::parse_reader(BufReader::new(file), logger))
    }

    /// Load a save file without blocking the async runtime
    pub async fn load_async(path: &Path, logger: &GameLogger) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(format::parse_reader(bytes.as_slice(), logger))
    }

    /// Parse a save file from a string
    pub fn parse(contents: &str, logger: &GameLogger) -> Self {
        format::parse_save(contents, logger)
    }

    /// Render as save file text
    pub fn to_text(&self) -> String {
        writer::render_save(&self.map_set_name, &self.levels)
    }

    /// Write to disk, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        writer::write_save(
            std::io::BufWriter::new(file),
            &self.map_set_name,
            &self.levels,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
