//! Logger module
//!
//! Leveled, named-channel logging for the dispatch pipeline:
//! - `Level` with a total order (`Info < Warn < Error < None`)
//! - `Logger`, an injected handle holding the sink threshold and targets
//! - named channels (`router`, `access`) that tag each line
//!
//! The logger is passed into each middleware's constructor; nothing in this
//! crate touches global state. The sink is append-only and tolerates
//! concurrent writes from simultaneous requests.

pub mod writer;

use std::fmt;
use std::io;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::LogConfig;

/// Log verbosity level
///
/// `None` is the highest value: a sink threshold of `None` suppresses
/// everything, and a record at level `None` is never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
    None,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::None => "NONE",
        };
        f.write_str(name)
    }
}

/// Shared logging sink
pub struct Logger {
    threshold: Level,
    writer: writer::LogWriter,
}

impl Logger {
    /// Build a logger from the sink configuration
    ///
    /// Fails only when a configured log file cannot be opened.
    pub fn from_config(cfg: &LogConfig) -> io::Result<Self> {
        Ok(Self {
            threshold: cfg.level,
            writer: writer::LogWriter::new(
                cfg.access_log_file.as_deref(),
                cfg.error_log_file.as_deref(),
            )?,
        })
    }

    /// Logger that prints to stdout/stderr at the given threshold
    pub fn stdio(threshold: Level) -> Self {
        Self {
            threshold,
            // Stdout/stderr construction cannot fail
            writer: writer::LogWriter::new(None, None).expect("stdio log writer"),
        }
    }

    /// Whether a record at `level` would reach the sink
    pub fn would_log(&self, level: Level) -> bool {
        level != Level::None && self.threshold != Level::None && level >= self.threshold
    }

    /// Named-channel lookup; the channel name tags every line
    pub fn named(self: &Arc<Self>, name: &'static str) -> NamedLogger {
        NamedLogger {
            name,
            logger: Arc::clone(self),
        }
    }

    /// Emit one raw access line at INFO, untagged
    ///
    /// Access lines carry their own format, so no channel prefix is added.
    pub fn access_line(&self, line: &str) {
        if self.would_log(Level::Info) {
            self.writer.write_info(line);
        }
    }

    fn log(&self, name: &str, level: Level, message: &str) {
        if !self.would_log(level) {
            return;
        }
        let line = format!("[{name}] [{level}] {message}");
        match level {
            Level::Info => self.writer.write_info(&line),
            _ => self.writer.write_error(&line),
        }
    }
}

/// Handle for one named log channel
#[derive(Clone)]
pub struct NamedLogger {
    name: &'static str,
    logger: Arc<Logger>,
}

impl NamedLogger {
    pub fn log(&self, level: Level, message: &str) {
        self.logger.log(self.name, level, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}
