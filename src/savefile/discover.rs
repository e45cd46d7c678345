//! Bulk discovery of save files
//!
//! Walks a directory tree with jwalk on a blocking thread and parses every
//! `.skb` file as its path arrives.

use crate::game::{GameLogger, Severity, VerbosityLevel};
use crate::savefile::format;
use crate::Result;
use std::path::{Path, PathBuf};

pub const SAVE_EXTENSION: &str = "skb";

/// What one save file contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub map_set_name: String,
    pub levels: usize,
    /// Rows or levels the parser had to drop or warn about
    pub warnings: usize,
}

async fn summarize(path: PathBuf) -> Result<SaveSummary> {
    let bytes = tokio::fs::read(&path).await?;

    let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
    logger.enable_capture();
    let save = format::parse_reader(bytes.as_slice(), &logger);
    let warnings =
        logger.count_severity(Severity::Warning) + logger.count_severity(Severity::Severe);

    Ok(SaveSummary {
        path,
        map_set_name: save.map_set_name,
        levels: save.levels.len(),
        warnings,
    })
}

/// Parse every save file under `dir`, sorted by path
///
/// Unreadable files are returned as errors alongside their path rather than
/// aborting the scan.
pub async fn scan_directory(dir: &Path) -> Result<Vec<(PathBuf, Result<SaveSummary>)>> {
    let root = dir.to_path_buf();
    let (path_tx, mut path_rx) = tokio::sync::mpsc::unbounded_channel();

    let walker = tokio::task::spawn_blocking(move || -> Result<()> {
        for entry in jwalk::WalkDir::new(&root).sort(true) {
            let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
            let path = entry.path();
            let is_save = entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == SAVE_EXTENSION);
            if is_save && path_tx.send(path).is_err() {
                break;
            }
        }
        Ok(())
    });

    let mut tasks = Vec::new();
    while let Some(path) = path_rx.recv().await {
        let task_path = path.clone();
        tasks.push((path, tokio::spawn(summarize(task_path))));
    }
    walker.await??;

    let mut results = Vec::with_capacity(tasks.len());
    for (path, task) in tasks {
        results.push((path, task.await?));
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(results)
}
