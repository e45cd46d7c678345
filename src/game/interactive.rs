//! Text front-end for playing in a terminal
//!
//! Reads commands line by line and redraws the composed level after each
//! one. Level completions are recorded in the score store under the
//! session's player name.

use crate::game::engine::{GameEngine, KeyInput, LevelCompletion};
use crate::score::ScoreStore;
use crate::{Result, SokobanError};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// One parsed user command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Key(KeyInput),
    Undo,
    Reset,
    /// Save to the given path, or to the session default
    Save(Option<PathBuf>),
    Scores,
    Debug,
    Help,
    Quit,
}

const HELP: &str = "Commands:
  w/a/s/d, up/left/down/right   move (several letters per line are allowed, e.g. 'ddw')
  u, undo                       undo the last move
  r, reset                      undo every move on this level
  save [path]                   write the session to a save file
  scores                        top 10 for the current level
  debug                         toggle debug output
  ?, help                       this message
  q, quit                       leave the game";

impl Command {
    fn from_letter(c: char) -> Option<Command> {
        let key = match c {
            'w' => KeyInput::Up,
            'a' => KeyInput::Left,
            's' => KeyInput::Down,
            'd' => KeyInput::Right,
            _ => return None,
        };
        Some(Command::Key(key))
    }

    /// Parse a line of input; blank lines give no commands
    pub fn parse_line(line: &str) -> Vec<Command> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        let lower = line.to_lowercase();
        let mut words = lower.split_whitespace();
        let head = words.next().unwrap_or_default();

        let single = match head {
            "up" => Some(Command::Key(KeyInput::Up)),
            "down" => Some(Command::Key(KeyInput::Down)),
            "left" => Some(Command::Key(KeyInput::Left)),
            "right" => Some(Command::Key(KeyInput::Right)),
            "u" | "undo" => Some(Command::Undo),
            "r" | "reset" => Some(Command::Reset),
            "save" => {
                // Keep the original case of the path
                let path = line.split_whitespace().nth(1).map(PathBuf::from);
                Some(Command::Save(path))
            }
            "scores" | "top" => Some(Command::Scores),
            "debug" => Some(Command::Debug),
            "?" | "help" => Some(Command::Help),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        };
        if let Some(command) = single {
            return vec![command];
        }

        // A run of movement letters
        let moves: Option<Vec<Command>> = head.chars().map(Command::from_letter).collect();
        match moves {
            Some(moves) if words.next().is_none() => moves,
            _ => vec![Command::Key(KeyInput::Other(line.to_string()))],
        }
    }
}

/// A play session wired to a terminal-like reader/writer pair
pub struct InteractiveSession<'a> {
    engine: &'a mut GameEngine,
    scores: &'a mut ScoreStore,
    player: String,
    save_path: PathBuf,
}

impl<'a> InteractiveSession<'a> {
    pub fn new(
        engine: &'a mut GameEngine,
        scores: &'a mut ScoreStore,
        player: impl Into<String>,
        save_path: impl Into<PathBuf>,
    ) -> Self {
        InteractiveSession {
            engine,
            scores,
            player: player.into(),
            save_path: save_path.into(),
        }
    }

    /// Run until quit, end of input or the last level is finished
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{}", self.engine.map_set_name())?;
        self.draw(&mut output)?;

        for line in input.lines() {
            let line = line?;
            let mut quit = false;
            for command in Command::parse_line(&line) {
                if !self.execute(command, &mut output)? {
                    quit = true;
                    break;
                }
            }
            if quit || self.engine.is_game_complete() {
                break;
            }
            self.draw(&mut output)?;
        }

        output.flush()?;
        Ok(())
    }

    /// Apply one command; `false` means stop
    fn execute<W: Write>(&mut self, command: Command, output: &mut W) -> Result<bool> {
        match command {
            Command::Key(key) => match self.engine.handle_key(key) {
                Ok(outcome) => {
                    if outcome.level_completed {
                        self.finish_level(output)?;
                    }
                }
                Err(SokobanError::InvalidInput(name)) => {
                    writeln!(output, "Unknown command '{name}' (type ? for help)")?;
                }
                Err(e) => return Err(e),
            },
            Command::Undo => {
                if !self.engine.undo()? {
                    writeln!(output, "Nothing to undo")?;
                }
            }
            Command::Reset => {
                let undone = self.engine.reset_level()?;
                writeln!(output, "Reset level ({undone} moves undone)")?;
            }
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.save_path.clone());
                match self.engine.save_path(&path) {
                    Ok(()) => writeln!(output, "Saved to {}", path.display())?,
                    Err(e) => writeln!(output, "Could not save {}: {e}", path.display())?,
                }
            }
            Command::Scores => {
                if let Some(level) = self.engine.current_level() {
                    let index = level.index();
                    writeln!(output, "{}", self.scores.display_table(index)?)?;
                }
            }
            Command::Debug => {
                self.engine.toggle_debug();
                let state = if self.engine.is_debug_active() {
                    "on"
                } else {
                    "off"
                };
                writeln!(output, "Debug {state}")?;
            }
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn finish_level<W: Write>(&mut self, output: &mut W) -> Result<()> {
        let completion = match self.engine.acknowledge_level_complete() {
            Some(completion) => completion,
            None => return Ok(()),
        };
        self.record_score(&completion);

        let is_final = self.engine.is_game_complete();
        writeln!(output, "Level Over!\n{}\n", completion.message(is_final))?;
        let table = self
            .scores
            .display_table(completion.index)
            .unwrap_or_else(|_| "No Records".to_string());
        writeln!(output, "{table}")?;

        if is_final {
            writeln!(output, "Game Over!\n{}", self.engine.victory_message())?;
        }
        Ok(())
    }

    fn record_score(&mut self, completion: &LevelCompletion) {
        if let Err(e) = self.scores.record(
            completion.index,
            &self.player,
            completion.moves,
            completion.seconds,
        ) {
            self.engine
                .logger
                .warning("score", &format!("could not record score: {e}"));
        }
    }

    fn draw<W: Write>(&self, output: &mut W) -> Result<()> {
        let level = match self.engine.current_level() {
            Some(level) => level,
            None => return Ok(()),
        };
        let counters = self.engine.counters();
        write!(output, "{}", self.engine.grid(level))?;
        writeln!(
            output,
            "Level: {}\t\t\tMoves: {}\t\t\tTime: {}s",
            level.index() + 1,
            counters.moves_count,
            counters.level_seconds
        )?;
        write!(output, "> ")?;
        output.flush()?;
        Ok(())
    }
}
