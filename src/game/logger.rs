//! Session logger with in-memory capture
//!
//! Messages are filtered by verbosity and routed to stdout, an in-memory
//! buffer, or both. Warnings and severe errors always go to stderr as well.
//! Formatted messages go through a bump arena so hot paths (per-move debug
//! output) do not allocate intermediate strings.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt::{self, Write as FmtWrite};
use std::ops::Deref;
use std::time::{SystemTime, UNIX_EPOCH};

/// How much the engine reports while running
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Silent - no output
    Silent = 0,
    /// Minimal - level and game completion only
    Minimal = 1,
    /// Normal - loads, saves and level transitions (default)
    #[default]
    Normal = 2,
    /// Verbose - every move and the level state (debug mode)
    Verbose = 3,
}

impl std::str::FromStr for VerbosityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityLevel::Silent),
            "minimal" | "1" => Ok(VerbosityLevel::Minimal),
            "normal" | "2" => Ok(VerbosityLevel::Normal),
            "verbose" | "3" => Ok(VerbosityLevel::Verbose),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// Severity attached to captured entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Severe,
}

/// A captured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub severity: Severity,
    pub message: String,
    /// Optional category (e.g., "move", "load", "score")
    pub category: Option<String>,
}

/// Read-only access to captured log entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Logger owned by one game session
///
/// Uses `RefCell` internally so logging works through `&self`; this makes
/// the logger (and the engine that owns it) single-threaded.
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    /// Prefix warnings and severe messages with a wall-clock timestamp
    timestamps: bool,

    /// Bump allocator for temporary string formatting
    format_bump: RefCell<Bump>,

    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            timestamps: true,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Capture to memory only (suppresses stdout)
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn set_timestamps(&mut self, enabled: bool) {
        self.timestamps = enabled;
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Would a message at `level` be printed or captured?
    #[inline]
    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level <= self.verbosity || self.is_capturing()
    }

    /// Get access to captured log entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
        self.format_bump.borrow_mut().reset();
    }

    /// Print buffered logs that verbosity allows, then clear the buffer
    pub fn flush_buffer(&mut self) {
        {
            let buffer = self.log_buffer.borrow();
            for entry in buffer.iter().filter(|e| e.level <= self.verbosity) {
                println!("{}", entry.message);
            }
        }
        self.clear_logs();
    }

    fn record(
        &self,
        level: VerbosityLevel,
        severity: Severity,
        category: Option<&str>,
        message: &str,
    ) {
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);

        if should_capture {
            self.log_buffer.borrow_mut().push(LogEntry {
                level,
                severity,
                message: message.to_string(),
                category: category.map(str::to_string),
            });
        }

        if should_output && level <= self.verbosity {
            println!("{}", message);
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        if self.enabled(VerbosityLevel::Minimal) {
            self.record(VerbosityLevel::Minimal, Severity::Info, None, message);
        }
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        if self.enabled(VerbosityLevel::Normal) {
            self.record(VerbosityLevel::Normal, Severity::Info, None, message);
        }
    }

    /// Log a formatted message under a category
    ///
    /// Formatting happens in the bump arena and only when the message will
    /// actually be printed or captured.
    pub fn event(&self, level: VerbosityLevel, category: &str, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let mut bump = self.format_bump.borrow_mut();
        {
            let mut buf = bumpalo::collections::String::new_in(&*bump);
            // Writing into a bump string cannot fail
            let _ = buf.write_fmt(args);
            self.record(level, Severity::Info, Some(category), buf.as_str());
        }
        bump.reset();
    }

    /// Recoverable problem (bad save rows, unknown keys); always reaches stderr
    pub fn warning(&self, category: &str, message: &str) {
        let line = self.stamp(message);
        eprintln!("WARNING: {line}");
        if self.is_capturing() {
            self.log_buffer.borrow_mut().push(LogEntry {
                level: VerbosityLevel::Minimal,
                severity: Severity::Warning,
                message: line,
                category: Some(category.to_string()),
            });
        }
    }

    /// Fatal problem for the current operation; always reaches stderr
    pub fn severe(&self, category: &str, message: &str) {
        let line = self.stamp(message);
        eprintln!("SEVERE: {line}");
        if self.is_capturing() {
            self.log_buffer.borrow_mut().push(LogEntry {
                level: VerbosityLevel::Minimal,
                severity: Severity::Severe,
                message: line,
                category: Some(category.to_string()),
            });
        }
    }

    fn stamp(&self, message: &str) -> String {
        if !self.timestamps {
            return message.to_string();
        }
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("{secs} -- {message}")
    }

    /// Captured entries with the given severity
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.logs()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

impl Clone for GameLogger {
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            timestamps: self.timestamps,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }
}
