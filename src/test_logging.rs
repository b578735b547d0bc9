//! Logging bootstrap for unit tests.
//!
//! Test output should be deterministic, verbose, and immune to whatever
//! logging a production default would set up. [`test_config`] builds a
//! configuration where the root logger has exactly one sink: a stdout
//! console appender using the shared [`TEST_PATTERN`] layout at `Debug`.
//! Callers may pass per-subsystem overrides, registered as supplied with no
//! merging or validation; a repeated name silently replaces the earlier
//! entry.
//!
//! [`init`] applies such a configuration process-wide, once, before any
//! test runs. This mutates global logging state on purpose; it is a
//! test-only override, not a general-purpose API.

use crate::config::{AppenderConfig, AppenderKind, ConsoleTarget, LogConfiguration, LoggerEntry};
use crate::error::LogError;
use crate::level::LogLevel;
use crate::manager::{self, LogManager};
use crate::name::LoggerName;

/// Layout shared by every test run.
pub const TEST_PATTERN: &str = "%{time:%H:%M:%S%.3f} [%thread] %{level:-5} %logger - %msg";

/// Name of the single console appender the bootstrap registers.
pub const TEST_APPENDER: &str = "console";

/// Build the unit-test configuration: production defaults with the root
/// sink replaced by one stdout console appender at `Debug`, plus the given
/// per-logger overrides (last write wins on duplicate names).
pub fn test_config(loggers: impl IntoIterator<Item = LoggerEntry>) -> LogConfiguration {
    let mut config = LogConfiguration::default_config(ConsoleTarget::Stderr, LogLevel::Trace);

    config.appenders = vec![AppenderConfig {
        name: TEST_APPENDER.to_string(),
        kind: AppenderKind::Console {
            target: ConsoleTarget::Stdout,
        },
        pattern: Some(TEST_PATTERN.to_string()),
        level: Some(LogLevel::Debug),
    }];

    let root = config
        .loggers
        .entry(LoggerName::root())
        .or_insert_with(|| LoggerEntry::new(LoggerName::root()));
    // drop whatever sinks the default wired up, then attach ours
    root.appenders.clear();
    root.appenders.push(TEST_APPENDER.to_string());
    root.level = Some(LogLevel::Debug);

    for entry in loggers {
        config.loggers.insert(entry.name.clone(), entry);
    }

    config
}

/// One-shot process-global initialisation for a test run.
///
/// The first call installs [`test_config`] as the global pipeline; later
/// calls (and the losers of a racing first call) get the already-installed
/// manager back, so the setup is never re-entered.
pub fn init(
    loggers: impl IntoIterator<Item = LoggerEntry>,
) -> Result<&'static LogManager, LogError> {
    if let Some(manager) = manager::global() {
        return Ok(manager);
    }
    match manager::init_global(test_config(loggers)) {
        Ok(manager) => Ok(manager),
        Err(LogError::Init(_)) => manager::global()
            .ok_or_else(|| LogError::Init("global log manager unavailable".into())),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_of(config: &LogConfiguration) -> &LoggerEntry {
        config
            .loggers
            .get(&LoggerName::root())
            .expect("root entry present")
    }

    #[test]
    fn empty_input_yields_single_root_sink() {
        let config = test_config([]);

        assert_eq!(config.appenders.len(), 1);
        assert_eq!(config.appenders[0].name, TEST_APPENDER);
        let AppenderKind::Console { target } = config.appenders[0].kind else {
            panic!("expected a console appender");
        };
        assert_eq!(target, ConsoleTarget::Stdout);
        assert_eq!(config.appenders[0].pattern.as_deref(), Some(TEST_PATTERN));
        assert_eq!(config.appenders[0].level, Some(LogLevel::Debug));

        let root = root_of(&config);
        assert_eq!(root.level, Some(LogLevel::Debug));
        assert_eq!(root.appenders, vec![TEST_APPENDER.to_string()]);
        assert_eq!(config.loggers.len(), 1, "no named loggers beyond root");
    }

    #[test]
    fn named_logger_registered_as_supplied() {
        let config = test_config([
            LoggerEntry::new("com.example.Foo").with_level(LogLevel::Info)
        ]);

        let entry = &config.loggers[&LoggerName::new("com.example.Foo")];
        assert_eq!(entry.level, Some(LogLevel::Info));

        // root untouched by the override
        let root = root_of(&config);
        assert_eq!(root.level, Some(LogLevel::Debug));
        assert_eq!(root.appenders, vec![TEST_APPENDER.to_string()]);
    }

    #[test]
    fn duplicate_name_last_write_wins() {
        let config = test_config([
            LoggerEntry::new("A").with_level(LogLevel::Debug),
            LoggerEntry::new("A").with_level(LogLevel::Error),
        ]);

        let matching: Vec<_> = config
            .loggers
            .keys()
            .filter(|name| **name == LoggerName::new("A"))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(
            config.loggers[&LoggerName::new("A")].level,
            Some(LogLevel::Error)
        );
    }

    #[test]
    fn rebuilding_still_yields_one_root_sink() {
        // building twice must not stack appenders on the root
        let _ = test_config([]);
        let config = test_config([]);
        assert_eq!(config.appenders.len(), 1);
        assert_eq!(root_of(&config).appenders.len(), 1);
    }

    #[test]
    fn root_override_replaces_root_entry() {
        // callers may override the root itself; plain keyed insert applies
        let config = test_config([LoggerEntry::new(LoggerName::root())
            .with_level(LogLevel::Warning)]);
        assert_eq!(root_of(&config).level, Some(LogLevel::Warning));
    }
}
