//! Log sink configuration, resolved once from the process environment.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `LOG_OUTPUT` | `stdout`, `stderr`, or a file path | `stdout` |
//! | `LOG_LEVEL` | `debug`, `info`, `warn`, `error` | `info` |
//!
//! Both values are trimmed and lower-cased before they are interpreted.
//! Anything unrecognised falls back to the default; configuration never
//! stops the process from starting.

use std::fmt;
use std::path::PathBuf;

/// Environment variable selecting where request records are written.
pub const LOG_OUTPUT: &str = "LOG_OUTPUT";

/// Environment variable selecting the minimum record severity.
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// Record severity. Ordered: `Debug < Info < Warn < Error`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    /// Lower-case name as written into each record's `level` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info  => "info",
            Self::Warn  => "warn",
            Self::Error => "error",
        }
    }

    /// Parses a level name, ignoring surrounding whitespace and case.
    /// Unknown or empty input yields [`Level::Info`].
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "debug" => Self::Debug,
            "info"  => Self::Info,
            "warn"  => Self::Warn,
            "error" => Self::Error,
            _       => Self::default(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the sink writes its records.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    /// Appended to; created if missing.
    File(PathBuf),
}

impl Output {
    /// Blank input selects stdout. `stdout` and `stderr` select those
    /// streams; any other value is taken as a file path.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            ""       => Self::Stdout,
            "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            path     => Self::File(PathBuf::from(path)),
        }
    }
}

/// Resolved sink configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SinkConfig {
    pub output: Output,
    pub level: Level,
}

impl SinkConfig {
    /// Reads [`LOG_OUTPUT`] and [`LOG_LEVEL`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let output = lookup(LOG_OUTPUT).unwrap_or_default();
        let level = lookup(LOG_LEVEL).unwrap_or_default();
        Self {
            output: Output::parse_or_default(&output),
            level: Level::parse_or_default(&level),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn unset_environment_uses_defaults() {
        let config = SinkConfig::from_lookup(env(&[]));
        assert_eq!(config.output, Output::Stdout);
        assert_eq!(config.level, Level::Info);
    }

    #[test]
    fn level_is_trimmed_and_case_insensitive() {
        let config = SinkConfig::from_lookup(env(&[(LOG_LEVEL, "  ERROR \n")]));
        assert_eq!(config.level, Level::Error);

        assert_eq!(Level::parse_or_default("Debug"), Level::Debug);
        assert_eq!(Level::parse_or_default("warn"), Level::Warn);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(Level::parse_or_default("verbose"), Level::Info);
        assert_eq!(Level::parse_or_default(""), Level::Info);
    }

    #[test]
    fn output_selection() {
        assert_eq!(Output::parse_or_default("   "), Output::Stdout);
        assert_eq!(Output::parse_or_default("STDERR"), Output::Stderr);
        assert_eq!(
            Output::parse_or_default(" /var/log/App.log "),
            Output::File(PathBuf::from("/var/log/app.log")),
        );
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }
}
