//! Engine logger with in-memory capture
//!
//! Messages are formatted into a bump arena first, so a message that is
//! only printed never allocates on the heap. Captured entries use owned
//! Strings and are exposed through a guard type for iteration.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt::{self, Write as FmtWrite};
use std::ops::Deref;

/// Verbosity level for engine output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output
    Silent = 0,
    /// Minimal - only round and game outcomes
    Minimal = 1,
    /// Normal - turns, abilities, scoring (default)
    #[default]
    Normal = 2,
    /// Verbose - every move, rejection and status change
    Verbose = 3,
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout
    Stdout,
    /// Capture only to in-memory buffer (default; embedders read `logs()`)
    #[default]
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// Captured entries beyond this are dropped oldest-first
const DEFAULT_CAPACITY: usize = 4096;

/// A log entry with owned strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g. "move", "ability", "scoring")
    pub category: Option<&'static str>,
}

/// Guard type that provides read-only access to log entries
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

/// Centralized engine logger
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,
    capacity: usize,

    /// Bump allocator for temporary string formatting, reset after each message
    format_bump: RefCell<Bump>,

    /// Captured log entries
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    /// Create a logger with specified verbosity
    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_format: OutputFormat::default(),
            output_mode: OutputMode::default(),
            capacity: DEFAULT_CAPACITY,
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

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Check if log capture is enabled
    fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    /// Would a message at `level` go anywhere?
    #[inline]
    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level != VerbosityLevel::Silent && level <= self.verbosity
    }

    /// Get access to captured log entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    fn write_stdout(&self, level: VerbosityLevel, category: Option<&'static str>, message: &str) {
        match self.output_format {
            OutputFormat::Text => {
                if level == VerbosityLevel::Minimal {
                    println!("{}", message);
                } else {
                    println!("  {}", message);
                }
            }
            OutputFormat::Json => {
                let line = serde_json::json!({
                    "level": level,
                    "category": category,
                    "message": message,
                });
                println!("{}", line);
            }
        }
    }

    fn emit(&self, level: VerbosityLevel, category: Option<&'static str>, message: &str) {
        if self.is_capturing() {
            let mut buffer = self.log_buffer.borrow_mut();
            if buffer.len() >= self.capacity {
                let excess = buffer.len() + 1 - self.capacity;
                buffer.drain(..excess);
            }
            buffer.push(LogEntry {
                level,
                message: message.to_string(),
                category,
            });
        }
        if matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both) {
            self.write_stdout(level, category, message);
        }
    }

    /// Format and log; formatting goes through the bump arena
    pub fn log_args(&self, level: VerbosityLevel, category: Option<&'static str>, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let mut bump = self.format_bump.borrow_mut();
        {
            let mut text = bumpalo::collections::String::new_in(&bump);
            if text.write_fmt(args).is_ok() {
                self.emit(level, category, text.as_str());
            }
        }
        bump.reset();
    }

    /// Log at Minimal level
    #[inline]
    pub fn minimal(&self, message: &str) {
        if self.enabled(VerbosityLevel::Minimal) {
            self.emit(VerbosityLevel::Minimal, None, message);
        }
    }

    /// Log at Normal level
    #[inline]
    pub fn normal(&self, message: &str) {
        if self.enabled(VerbosityLevel::Normal) {
            self.emit(VerbosityLevel::Normal, None, message);
        }
    }

    /// Log at Verbose level
    #[inline]
    pub fn verbose(&self, message: &str) {
        if self.enabled(VerbosityLevel::Verbose) {
            self.emit(VerbosityLevel::Verbose, None, message);
        }
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

// Clones share settings but start with an empty buffer.
impl Clone for GameLogger {
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_format: self.output_format,
            output_mode: self.output_mode,
            capacity: self.capacity,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }
}

// Log contents are not part of a snapshot; settings never compare unequal.
impl PartialEq for GameLogger {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for GameLogger {}

impl Serialize for GameLogger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("GameLogger", 3)?;
        state.serialize_field("verbosity", &self.verbosity)?;
        state.serialize_field("output_format", &self.output_format)?;
        state.serialize_field("output_mode", &self.output_mode)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for GameLogger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GameLoggerData {
            verbosity: VerbosityLevel,
            output_format: OutputFormat,
            output_mode: OutputMode,
        }

        let data = GameLoggerData::deserialize(deserializer)?;
        let mut logger = GameLogger::with_verbosity(data.verbosity);
        logger.output_format = data.output_format;
        logger.output_mode = data.output_mode;
        Ok(logger)
    }
}
