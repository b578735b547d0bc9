//! Bridge from the `log` crate facade into the pipeline.
//!
//! Third-party crates log through the `log` facade; [`install`] routes
//! those records into a [`LogManager`], using each record's target as the
//! logger name so per-module configuration applies to foreign crates too.

use log::{Log, Metadata, Record};

use crate::error::LogError;
use crate::level::LogLevel;
use crate::manager::LogManager;

struct Facade {
    manager: &'static LogManager,
}

fn map_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warning,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

impl Log for Facade {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        // per-logger thresholds apply in log(); nothing cheaper exists here
        true
    }

    fn log(&self, record: &Record) {
        let logger = self.manager.logger(record.target());
        let level = map_level(record.level());
        if logger.enabled(level) {
            logger.log(level, &record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Install `manager` as the `log` crate's global logger and open the facade
/// up to `Trace` (filtering stays with the pipeline's own thresholds).
pub fn install(manager: &'static LogManager) -> Result<(), LogError> {
    log::set_boxed_logger(Box::new(Facade { manager }))
        .map_err(|e| LogError::Init(format!("log facade already installed: {e}")))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
