//! Save file end-to-end tests
//!
//! Parse, play, write and re-parse `.skb` text, on disk and in memory.

use similar_asserts::assert_eq;
use sokoban_engine::core::Direction;
use sokoban_engine::game::{EngineConfig, GameEngine, GameLogger, Severity, VerbosityLevel};
use sokoban_engine::savefile::{self, SaveFile};
use sokoban_engine::Result;
use std::path::PathBuf;

const THREE_LEVELS: &str = "MapSetName: Sample Set
LevelName: Alpha
WWWWWWW
WS C DW
WWWWWWW

LevelName: Beta
wwwwww
w s  w
w co w
w  d w
wwwwww

LevelName: Gamma
WWWWW
WSO W
WWWWW
";

fn capturing_logger() -> GameLogger {
    let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
    logger.enable_capture();
    logger.set_timestamps(false);
    logger
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sokoban_{}_{}", std::process::id(), name))
}

#[test]
fn test_markers_give_indexed_levels() {
    let logger = capturing_logger();
    let save = SaveFile::parse(THREE_LEVELS, &logger);

    assert_eq!(save.map_set_name, "Sample Set");
    let names: Vec<_> = save.levels.iter().map(|l| l.name()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    for (i, level) in save.levels.iter().enumerate() {
        assert_eq!(level.index(), i);
    }
    assert_eq!(save.levels[1].diamond_count(), 2);
    assert_eq!(logger.count_severity(Severity::Warning), 0);
}

#[test]
fn test_serialize_then_parse_keeps_object_grids() {
    let logger = capturing_logger();
    let save = SaveFile::parse(THREE_LEVELS, &logger);
    let text = save.to_text();
    let reparsed = SaveFile::parse(&text, &logger);

    assert_eq!(reparsed.levels.len(), save.levels.len());
    for (a, b) in save.levels.iter().zip(&reparsed.levels) {
        assert_eq!(a.objects_grid(), b.objects_grid());
        assert_eq!(a.diamonds_grid(), b.diamonds_grid());
    }
}

#[test]
fn test_written_text_format() {
    let logger = capturing_logger();
    let save = SaveFile::parse(THREE_LEVELS, &logger);
    let expected = "MapSetName: Sample Set
LevelName: Alpha
WWWWWWW
WS C DW
WWWWWWW

LevelName: Beta
WWWWWW
W S  W
W CO W
W  D W
WWWWWW

LevelName: Gamma
WWWWW
WSO W
WWWWW

";
    assert_eq!(save.to_text(), expected);
}

#[test]
fn test_mid_game_save_and_reload() -> Result<()> {
    let mut engine = GameEngine::from_text(THREE_LEVELS, EngineConfig::new(VerbosityLevel::Silent));
    engine.move_keeper(Direction::Right)?;

    let path = scratch_file("midgame.skb");
    engine.save_path(&path)?;

    let logger = capturing_logger();
    let reloaded = SaveFile::load(&path, &logger)?;
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded.levels.len(), 3);
    let alpha = &reloaded.levels[0];
    assert_eq!(alpha.to_string(), "WWWWWWW\nW SC DW\nWWWWWWW\n");
    assert_eq!(
        alpha.keeper_position(),
        engine.current_level().unwrap().keeper_position()
    );
    Ok(())
}

#[test]
fn test_engine_load_replaces_levels() -> Result<()> {
    let mut engine = GameEngine::from_text(
        "LevelName: Old\nWWWWW\nWSCDW\nWWWWW\n",
        EngineConfig::new(VerbosityLevel::Silent),
    );
    let count = engine.load_game_file(THREE_LEVELS.as_bytes())?;
    assert_eq!(count, 3);
    assert_eq!(engine.current_level().unwrap().name(), "Alpha");
    assert_eq!(engine.map_set_name(), "Sample Set");
    Ok(())
}

#[test]
fn test_broken_levels_are_skipped() {
    let logger = capturing_logger();
    let contents = "MapSetName: Mixed
LevelName: TwoKeepers
WWWWW
WSSDW
WWWWW
LevelName: Fine
WWWWW
WSCDW
WWWWW
LevelName: Ragged
WWWWW
WSCDW W
WWW
";
    let save = savefile::parse_save(contents, &logger);
    let names: Vec<_> = save.levels.iter().map(|l| l.name()).collect();
    assert_eq!(names, vec!["Fine", "Ragged"]);
    assert_eq!(save.levels[1].index(), 1);
    // One skipped level, one ragged level
    assert_eq!(logger.count_severity(Severity::Warning), 2);
    assert_eq!(save.levels[1].to_string(), "WWWWW\nWSCDW\nWWW==\n");
}

#[tokio::test]
async fn test_load_async_matches_sync() -> Result<()> {
    let path = scratch_file("async.skb");
    std::fs::write(&path, THREE_LEVELS)?;

    let logger = capturing_logger();
    let sync = SaveFile::load(&path, &logger)?;
    let async_loaded = SaveFile::load_async(&path, &logger).await?;
    std::fs::remove_file(&path).ok();

    assert_eq!(sync, async_loaded);
    Ok(())
}

#[tokio::test]
async fn test_load_async_missing_file() {
    let logger = capturing_logger();
    let result = SaveFile::load_async(&scratch_file("missing.skb"), &logger).await;
    assert!(result.is_err());
}
