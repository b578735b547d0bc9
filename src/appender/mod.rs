//! Appenders: destinations that receive formatted log records.
//!
//! Appenders are constructed once from [`AppenderConfig`] entries and then
//! owned exclusively by the appender worker thread, so implementations need
//! no internal locking.

pub mod console;
#[cfg(feature = "appender-file")]
pub mod file;

pub use console::ConsoleAppender;
#[cfg(feature = "appender-file")]
pub use file::FileAppender;

use crate::config::{AppenderConfig, AppenderKind, DEFAULT_PATTERN};
use crate::error::LogError;
use crate::level::LogLevel;
use crate::message::{EnvMask, LogMessage};
use crate::pattern::Pattern;

pub trait Appender: Send {
    /// Write one record. Threshold filtering happens in the caller via
    /// [`Appender::threshold`]; a failing sink must not take down the worker.
    fn append(&mut self, msg: &LogMessage);

    /// Appender-side level filter, if any.
    fn threshold(&self) -> Option<LogLevel>;

    /// Environment data this appender's layout needs.
    fn env_mask(&self) -> EnvMask;

    /// Flush and release resources. Called once, from the worker, after the
    /// queue has drained.
    fn close(&mut self) {}
}

/// Build an appender from its resolved configuration. Layout compilation
/// and file opening happen here, so a bad pattern or unwritable path fails
/// the whole pipeline setup.
pub fn create(config: &AppenderConfig) -> Result<Box<dyn Appender>, LogError> {
    let pattern = Pattern::new(config.pattern.as_deref().unwrap_or(DEFAULT_PATTERN))?;
    match &config.kind {
        AppenderKind::Console { target } => {
            Ok(Box::new(ConsoleAppender::new(pattern, config.level, *target)))
        }
        #[cfg(feature = "appender-file")]
        AppenderKind::File(params) => Ok(Box::new(FileAppender::open(
            pattern,
            config.level,
            params.clone(),
        )?)),
        #[cfg(not(feature = "appender-file"))]
        AppenderKind::File(_) => Err(LogError::Config(format!(
            "appender '{}' needs the appender-file feature",
            config.name
        ))),
    }
}
