//! Game session: level sequence, move state machine and undo
//!
//! `GameEngine` is an ordinary owned value; callers construct one per
//! session and pass it by reference to whatever needs it. It is not `Sync`
//! (its logger uses `RefCell`) and must only be driven from one thread.
//! Every mutating call runs to completion before returning, so reads such
//! as [`GameEngine::counters`] never observe a half-applied move.

use crate::core::{Direction, Grid, GridObject, Level, Point};
use crate::game::{GameLogger, VerbosityLevel};
use crate::savefile::{self, SaveFile};
use crate::undo::{MoveRecord, UndoLog};
use crate::{Result, SokobanError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds timestamp source
pub type Clock = fn() -> u64;

/// Wall-clock milliseconds since the Unix epoch
pub fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

const MILLIS_PER_SECOND: u64 = 1000;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Playing the current level
    Playing,
    /// A level was just completed; the cursor already points at the next one
    LevelComplete,
    /// No levels remain
    GameComplete,
}

/// Raw key event from the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Up,
    Down,
    Left,
    Right,
    /// Any other key, by name
    Other(String),
}

impl KeyInput {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            KeyInput::Up => Some(Direction::Up),
            KeyInput::Down => Some(Direction::Down),
            KeyInput::Left => Some(Direction::Left),
            KeyInput::Right => Some(Direction::Right),
            KeyInput::Other(_) => None,
        }
    }
}

/// Result of a single move attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// The keeper actually moved
    pub accepted: bool,
    pub pushed_crate: bool,
    /// This move completed the level
    pub level_completed: bool,
    /// Cells whose contents changed (for partial redraws)
    pub changed: SmallVec<[Point; 3]>,
}

impl MoveOutcome {
    /// The game is over; nothing was attempted
    pub fn ignored() -> Self {
        MoveOutcome::default()
    }

    /// Blocked by a wall or an immovable crate
    pub fn rejected() -> Self {
        MoveOutcome::default()
    }
}

/// Summary of a finished level, kept until the UI acknowledges it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCompletion {
    pub index: usize,
    pub name: String,
    /// Moves made on this level
    pub moves: u32,
    /// Whole seconds spent on this level
    pub seconds: u64,
    /// Session move count at completion
    pub total_moves: u32,
}

impl LevelCompletion {
    pub fn message(&self, is_final: bool) -> String {
        let label = if is_final {
            "Final Level".to_string()
        } else {
            format!("Level {}", self.index)
        };
        format!(
            "You completed {} in {} moves!\nTotal moves: {}\nTime: {}s",
            label, self.moves, self.total_moves, self.seconds
        )
    }
}

/// Plain copy of the counters a periodic display refresh needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub level_index: Option<usize>,
    pub moves_count: u32,
    pub current_moves: u32,
    pub time_start: u64,
    pub time_end: u64,
    pub time_count: u64,
    /// Whole seconds since the current level started
    pub level_seconds: u64,
    pub level_complete: bool,
    pub game_complete: bool,
}

/// Session-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub verbosity: VerbosityLevel,
    /// Start in debug mode (per-move state dumps)
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(VerbosityLevel::default())
    }
}

impl EngineConfig {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        EngineConfig {
            verbosity,
            debug: false,
        }
    }
}

/// The game session
pub struct GameEngine {
    map_set_name: String,
    levels: Vec<Level>,
    current: Option<usize>,
    state: SessionState,

    /// Session move count (undo adds a penalty move)
    moves_count: u32,
    /// Moves on the current level
    current_moves: u32,
    time_start: u64,
    time_end: u64,
    /// Accumulated whole seconds over completed levels
    time_count: u64,

    undo_log: UndoLog,
    last_direction: Option<Direction>,
    last_completion: Option<LevelCompletion>,

    debug: bool,
    base_verbosity: VerbosityLevel,
    pub logger: GameLogger,
    clock: Clock,
}

impl GameEngine {
    /// Start a session over the levels of a parsed save file
    pub fn new(save: SaveFile) -> Self {
        Self::with_config(save, EngineConfig::new(VerbosityLevel::default()))
    }

    pub fn with_config(save: SaveFile, config: EngineConfig) -> Self {
        let mut logger = GameLogger::with_verbosity(config.verbosity);
        if config.debug {
            logger.set_verbosity(VerbosityLevel::Verbose);
        }
        let clock: Clock = system_millis;
        let mut engine = GameEngine {
            map_set_name: String::new(),
            levels: Vec::new(),
            current: None,
            state: SessionState::GameComplete,
            moves_count: 0,
            current_moves: 0,
            time_start: clock(),
            time_end: 0,
            time_count: 0,
            undo_log: UndoLog::new(),
            last_direction: None,
            last_completion: None,
            debug: config.debug,
            base_verbosity: config.verbosity,
            logger,
            clock,
        };
        engine.install(save);
        engine
    }

    /// Parse and start a session from save file text
    pub fn from_text(contents: &str, config: EngineConfig) -> Self {
        let logger = GameLogger::with_verbosity(config.verbosity);
        Self::with_config(savefile::parse_save(contents, &logger), config)
    }

    /// Replace the time source (tests, replays)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.time_start = clock();
        self
    }

    /// Swap in a new level sequence and reset every counter
    fn install(&mut self, save: SaveFile) {
        self.map_set_name = save.map_set_name;
        self.levels = save.levels;
        self.current = if self.levels.is_empty() {
            None
        } else {
            Some(0)
        };
        self.state = if self.current.is_some() {
            SessionState::Playing
        } else {
            SessionState::GameComplete
        };
        self.moves_count = 0;
        self.current_moves = 0;
        self.time_start = (self.clock)();
        self.time_end = 0;
        self.time_count = 0;
        self.undo_log.clear();
        self.last_direction = None;
        self.last_completion = None;
    }

    /// Load a new session from a save stream
    ///
    /// The new session is parsed completely before anything is replaced; if
    /// it yields no levels the current session is left untouched.
    pub fn load_game_file<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let save = savefile::parse_reader(reader, &self.logger);
        if save.is_empty() {
            self.logger
                .warning("load", "save file contained no playable levels");
            return Err(SokobanError::MalformedSave(
                "no playable levels found".to_string(),
            ));
        }
        let count = save.levels.len();
        self.logger.event(
            VerbosityLevel::Normal,
            "load",
            format_args!("Loaded '{}' with {} levels", save.map_set_name, count),
        );
        self.install(save);
        Ok(count)
    }

    /// Write every level (in its current state) to a save stream
    pub fn save_game_file<W: Write>(&self, writer: W) -> Result<()> {
        savefile::write_save(writer, &self.map_set_name, &self.levels)?;
        self.logger.event(
            VerbosityLevel::Normal,
            "save",
            format_args!(
                "Saved '{}' ({} levels)",
                self.map_set_name,
                self.levels.len()
            ),
        );
        Ok(())
    }

    pub fn save_path(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.save_game_file(std::io::BufWriter::new(file))
    }

    /// Translate a key press into a move
    ///
    /// The keeper turns to face the key direction even when the move is
    /// blocked. Non-arrow keys are rejected with `InvalidInput`.
    pub fn handle_key(&mut self, key: KeyInput) -> Result<MoveOutcome> {
        let direction = match key.direction() {
            Some(direction) => direction,
            None => {
                let name = match key {
                    KeyInput::Other(name) => name,
                    _ => String::new(),
                };
                self.logger
                    .warning("input", &format!("Invalid keyboard input: {name}"));
                return Err(SokobanError::InvalidInput(name));
            }
        };

        let outcome = self.move_keeper(direction)?;
        self.last_direction = Some(direction);
        Ok(outcome)
    }

    /// Try to move the keeper one cell
    pub fn move_keeper(&mut self, direction: Direction) -> Result<MoveOutcome> {
        let index = match self.current {
            Some(index) => index,
            None => return Ok(MoveOutcome::ignored()),
        };
        if self.state == SessionState::LevelComplete {
            self.state = SessionState::Playing;
        }

        let delta = direction.delta();
        let level = &mut self.levels[index];
        let keeper_pos = level.keeper_position();
        let target = keeper_pos.translate(delta);
        let keeper_target = level.object_at(target)?;

        #[cfg(feature = "verbose-logging")]
        if self.debug {
            self.logger.event(
                VerbosityLevel::Verbose,
                "move",
                format_args!(
                    "Current level state:\n{}Keeper pos: {}\nTarget object: {:?} at {}",
                    level, keeper_pos, keeper_target, target
                ),
            );
        }

        let mut changed = SmallVec::new();
        let displaced = match keeper_target {
            Some(GridObject::Wall) => return Ok(MoveOutcome::rejected()),
            Some(GridObject::Crate) => {
                let push_target = target.translate(delta);
                if level.object_at(push_target)? != Some(GridObject::Floor) {
                    return Ok(MoveOutcome::rejected());
                }
                level.move_object_by(GridObject::Crate, target, delta)?;
                level.move_object_by(GridObject::Keeper, keeper_pos, delta)?;
                changed.extend([keeper_pos, target, push_target]);
                GridObject::Crate
            }
            Some(GridObject::Floor) => {
                level.move_object_by(GridObject::Keeper, keeper_pos, delta)?;
                changed.extend([keeper_pos, target]);
                GridObject::Floor
            }
            other => {
                let detail = format!(
                    "keeper target {} in level '{}' holds {:?}",
                    target,
                    level.name(),
                    other
                );
                self.logger.severe("move", &detail);
                return Err(SokobanError::InvariantViolation(detail));
            }
        };

        level.set_keeper_position(target);
        let completed = level.is_complete();

        self.undo_log.log(MoveRecord::new(direction, displaced));
        self.current_moves += 1;
        self.moves_count += 1;

        if completed {
            self.complete_level(index);
        }

        Ok(MoveOutcome {
            accepted: true,
            pushed_crate: displaced == GridObject::Crate,
            level_completed: completed,
            changed,
        })
    }

    fn complete_level(&mut self, index: usize) {
        self.time_end = (self.clock)();
        let seconds = self.time_end.saturating_sub(self.time_start) / MILLIS_PER_SECOND;
        self.time_count += seconds;
        self.undo_log.clear();

        let completion = LevelCompletion {
            index,
            name: self.levels[index].name().to_string(),
            moves: self.current_moves,
            seconds,
            total_moves: self.moves_count,
        };
        self.logger.event(
            VerbosityLevel::Minimal,
            "level",
            format_args!(
                "Level complete! '{}' in {} moves, {}s",
                completion.name, completion.moves, completion.seconds
            ),
        );
        self.last_completion = Some(completion);

        self.current_moves = 0;
        self.time_start = self.time_end;

        if index + 1 < self.levels.len() {
            self.current = Some(index + 1);
            self.state = SessionState::LevelComplete;
        } else {
            self.current = None;
            self.state = SessionState::GameComplete;
            self.logger.minimal(&self.victory_message());
        }
    }

    /// Reverse the most recent move; `false` if there was nothing to undo
    ///
    /// Each successful undo costs one move on the session counter.
    pub fn undo(&mut self) -> Result<bool> {
        let index = match self.current {
            Some(index) => index,
            None => return Ok(false),
        };
        let record = match self.undo_log.peek() {
            Some(record) => *record,
            None => return Ok(false),
        };

        if let Err(err) = unwind_move(&mut self.levels[index], record) {
            self.logger.severe("undo", &err.to_string());
            return Err(err);
        }

        self.undo_log.pop();
        self.moves_count += 1;
        self.current_moves = self.current_moves.saturating_sub(1);
        self.logger.event(
            VerbosityLevel::Verbose,
            "undo",
            format_args!("Undid {} ({})", record.direction, record.displaced),
        );
        Ok(true)
    }

    /// Undo every move on the current level, paying the penalty for each
    pub fn reset_level(&mut self) -> Result<usize> {
        let mut undone = 0;
        while self.undo()? {
            undone += 1;
        }
        Ok(undone)
    }

    /// Take the pending level-complete summary and resume play
    pub fn acknowledge_level_complete(&mut self) -> Option<LevelCompletion> {
        if self.state == SessionState::LevelComplete {
            self.state = SessionState::Playing;
        }
        self.last_completion.take()
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
        let verbosity = if self.debug {
            VerbosityLevel::Verbose
        } else {
            self.base_verbosity
        };
        self.logger.set_verbosity(verbosity);
    }

    pub fn is_debug_active(&self) -> bool {
        self.debug
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.current.map(|i| &self.levels[i])
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn map_set_name(&self) -> &str {
        &self.map_set_name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo_log
    }

    pub fn keeper_direction_log(&self) -> Vec<Direction> {
        self.undo_log.directions().collect()
    }

    pub fn target_log(&self) -> Vec<GridObject> {
        self.undo_log.targets().collect()
    }

    /// Direction of the last arrow key (for keeper sprite facing)
    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    pub fn last_completion(&self) -> Option<&LevelCompletion> {
        self.last_completion.as_ref()
    }

    pub fn moves_count(&self) -> u32 {
        self.moves_count
    }

    pub fn current_moves(&self) -> u32 {
        self.current_moves
    }

    pub fn time_start(&self) -> u64 {
        self.time_start
    }

    pub fn time_end(&self) -> u64 {
        self.time_end
    }

    pub fn time_count(&self) -> u64 {
        self.time_count
    }

    pub fn is_level_complete(&self) -> bool {
        match self.state {
            SessionState::LevelComplete => true,
            SessionState::GameComplete => self.last_completion.is_some(),
            SessionState::Playing => false,
        }
    }

    pub fn is_game_complete(&self) -> bool {
        self.state == SessionState::GameComplete
    }

    /// Composed copy of a level's grid, detached from live state
    pub fn grid(&self, level: &Level) -> Grid {
        level.composed_grid()
    }

    pub fn counters(&self) -> CounterSnapshot {
        let now = (self.clock)();
        CounterSnapshot {
            level_index: self.current,
            moves_count: self.moves_count,
            current_moves: self.current_moves,
            time_start: self.time_start,
            time_end: self.time_end,
            time_count: self.time_count,
            level_seconds: now.saturating_sub(self.time_start) / MILLIS_PER_SECOND,
            level_complete: self.is_level_complete(),
            game_complete: self.is_game_complete(),
        }
    }

    pub fn victory_message(&self) -> String {
        format!(
            "You completed {} in {} moves and {}s",
            self.map_set_name, self.moves_count, self.time_count
        )
    }

    /// Rebuild a session from previously captured parts
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        map_set_name: String,
        levels: Vec<Level>,
        current: Option<usize>,
        moves_count: u32,
        current_moves: u32,
        time_count: u64,
        undo_log: UndoLog,
        config: EngineConfig,
    ) -> Result<Self> {
        if let Some(index) = current {
            if index >= levels.len() {
                return Err(SokobanError::InvariantViolation(format!(
                    "current level {index} out of range ({} levels)",
                    levels.len()
                )));
            }
        }
        for level in &levels {
            if level.object_at(level.keeper_position())? != Some(GridObject::Keeper) {
                return Err(SokobanError::InvariantViolation(format!(
                    "keeper of level '{}' is not at {}",
                    level.name(),
                    level.keeper_position()
                )));
            }
        }
        // The log must unwind cleanly against the level it belongs to
        match current {
            Some(index) => {
                let mut scratch = levels[index].clone();
                for record in undo_log.records().iter().rev() {
                    unwind_move(&mut scratch, *record)?;
                }
            }
            None if !undo_log.is_empty() => {
                return Err(SokobanError::InvariantViolation(format!(
                    "{} undo records left after the game ended",
                    undo_log.len()
                )));
            }
            None => {}
        }

        let mut engine = Self::with_config(
            SaveFile {
                map_set_name,
                levels,
            },
            config,
        );
        engine.current = current;
        engine.state = if current.is_some() {
            SessionState::Playing
        } else {
            SessionState::GameComplete
        };
        engine.moves_count = moves_count;
        engine.current_moves = current_moves;
        engine.time_count = time_count;
        engine.undo_log = undo_log;
        Ok(engine)
    }
}

/// Reverse one logged move on `level`
///
/// The grid is checked against the record before anything changes, so a
/// record that does not match leaves the level untouched.
fn unwind_move(level: &mut Level, record: MoveRecord) -> Result<()> {
    let keeper_pos = level.keeper_position();
    let back = record.direction.inverse().delta();
    let behind = keeper_pos.translate(back);
    let ahead = keeper_pos.translate(record.direction.delta());

    let mismatch = |level: &Level, what: String| {
        SokobanError::InvariantViolation(format!(
            "cannot undo {} ({}) in level '{}': {}",
            record.direction,
            record.displaced,
            level.name(),
            what
        ))
    };

    // Out-of-bounds cells count as a mismatch, not a bounds error
    let behind_obj = level.object_at(behind).ok().flatten();
    if behind_obj != Some(GridObject::Floor) {
        return Err(mismatch(level, format!("{behind} holds {behind_obj:?}")));
    }

    match record.displaced {
        GridObject::Floor => {
            level.move_object_by(GridObject::Keeper, keeper_pos, back)?;
        }
        GridObject::Crate => {
            let ahead_obj = level.object_at(ahead).ok().flatten();
            if ahead_obj != Some(GridObject::Crate) {
                return Err(mismatch(level, format!("no crate at {ahead}, found {ahead_obj:?}")));
            }
            level.move_object_by(GridObject::Keeper, keeper_pos, back)?;
            level.move_object_by(GridObject::Crate, ahead, back)?;
        }
        other => return Err(mismatch(level, format!("a move onto {other} is never logged"))),
    }
    level.set_keeper_position(behind);
    Ok(())
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("map_set_name", &self.map_set_name)
            .field("levels", &self.levels.len())
            .field("current", &self.current)
            .field("state", &self.state)
            .field("moves_count", &self.moves_count)
            .field("undo_len", &self.undo_log.len())
            .finish()
    }
}
