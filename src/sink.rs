//! Structured log sink: one JSON object per line.
//!
//! The sink is an ordinary value. Build it once at startup and share it as
//! an `Arc<LogSink>`; nothing in this crate reaches for a process-wide
//! logger.
//!
//! Each record has the shape
//!
//! ```text
//! {"level":"info","time":"2024-05-01T12:00:00.000+0000","message":"Request", ...fields}
//! ```
//!
//! Writing never fails from the caller's point of view. A record that cannot
//! be serialised or written is dropped.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{Level, Output, SinkConfig};

/// Writes structured records at or above a minimum [`Level`].
pub struct LogSink {
    level: Level,
    // One lock around write + flush keeps concurrent records on separate
    // lines.
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogSink {
    /// Opens the configured output. A file that cannot be opened falls back
    /// to stdout.
    pub fn from_config(config: &SinkConfig) -> Self {
        let writer: Box<dyn Write + Send> = match &config.output {
            Output::Stdout => Box::new(io::stdout()),
            Output::Stderr => Box::new(io::stderr()),
            Output::File(path) => {
                match OpenOptions::new().create(true).append(true).open(path) {
                    Ok(file) => Box::new(file),
                    Err(e) => {
                        debug!(path = %path.display(), "log output unavailable, using stdout: {e}");
                        Box::new(io::stdout())
                    }
                }
            }
        };
        Self::new(config.level, writer)
    }

    /// Builds a sink over an arbitrary writer.
    pub fn new(level: Level, writer: Box<dyn Write + Send>) -> Self {
        Self { level, writer: Mutex::new(writer) }
    }

    /// The minimum severity this sink writes.
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Serialises one record and flushes it before returning.
    ///
    /// Field order is preserved. A field named `level`, `time` or `message`
    /// overwrites the header value in place.
    pub fn emit<I>(&self, level: Level, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if !self.enabled(level) {
            return;
        }

        let mut record = Map::new();
        record.insert("level".to_owned(), Value::from(level.as_str()));
        record.insert("time".to_owned(), Value::from(timestamp()));
        record.insert("message".to_owned(), Value::from(message));
        record.extend(fields);

        let mut line = match serde_json::to_vec(&record) {
            Ok(line) => line,
            Err(_) => return,
        };
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.write_all(&line).and_then(|()| writer.flush());
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()
}
