//! Log severity levels.
//!
//! Levels form a total order, `Trace` lowest. A message passes a threshold
//! when its level is greater than or equal to it.

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Lowest level, passes every threshold check.
    pub const MIN: LogLevel = LogLevel::Trace;

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    /// Case-insensitive: `"trace"`, `"debug"`, `"info"`, `"warning"`, `"error"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = if s.eq_ignore_ascii_case("trace") {
            LogLevel::Trace
        } else if s.eq_ignore_ascii_case("debug") {
            LogLevel::Debug
        } else if s.eq_ignore_ascii_case("info") {
            LogLevel::Info
        } else if s.eq_ignore_ascii_case("warning") {
            LogLevel::Warning
        } else if s.eq_ignore_ascii_case("error") {
            LogLevel::Error
        } else {
            return Err(LogError::Config(format!("unrecognised log level: '{s}'")));
        };
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        for (s, expected) in [
            ("trace", LogLevel::Trace),
            ("DEBUG", LogLevel::Debug),
            ("Info", LogLevel::Info),
            ("warning", LogLevel::Warning),
            ("error", LogLevel::Error),
        ] {
            assert_eq!(s.parse::<LogLevel>().unwrap(), expected);
        }
    }

    #[test]
    fn invalid_level_errors() {
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!("".parse::<LogLevel>().is_err());
        assert!("warn ".parse::<LogLevel>().is_err());
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::MIN, LogLevel::Trace);
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
        assert_eq!(LogLevel::Trace.to_string(), "TRACE");
    }
}
