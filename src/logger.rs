//! Logger front-end handed out by the manager.
//!
//! A [`Logger`] is a cheap clone (one `Arc`) bound to its effective
//! threshold, appender routing, and the shared record queue. Below-threshold
//! calls return before building anything; passing calls capture only the
//! environment data some appender's layout actually renders.

use std::error::Error;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;

use crate::level::LogLevel;
use crate::message::{EnvMask, EnvResource, LogMessage};
use crate::queue::LogQueue;

pub(crate) struct LoggerCore {
    pub(crate) name: String,
    pub(crate) threshold: LogLevel,
    pub(crate) appenders: Arc<Vec<String>>,
    pub(crate) env_mask: EnvMask,
    pub(crate) queue: Arc<LogQueue<LogMessage>>,
}

#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
}

impl Logger {
    pub(crate) fn from_core(core: Arc<LoggerCore>) -> Logger {
        Logger { core }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Whether a record at `level` would be queued. Lets callers skip
    /// expensive message formatting.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.core.threshold
    }

    pub fn log(&self, level: LogLevel, msg: &str) {
        if !self.enabled(level) {
            return;
        }
        self.write(level, msg, None);
    }

    pub fn log_err(&self, level: LogLevel, error: &dyn Error, msg: &str) {
        if !self.enabled(level) {
            return;
        }
        self.write(level, msg, Some(render_error_chain(error)));
    }

    pub fn trace(&self, msg: &str) {
        self.log(LogLevel::Trace, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log(LogLevel::Warning, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn trace_err(&self, error: &dyn Error, msg: &str) {
        self.log_err(LogLevel::Trace, error, msg);
    }

    pub fn debug_err(&self, error: &dyn Error, msg: &str) {
        self.log_err(LogLevel::Debug, error, msg);
    }

    pub fn info_err(&self, error: &dyn Error, msg: &str) {
        self.log_err(LogLevel::Info, error, msg);
    }

    pub fn warning_err(&self, error: &dyn Error, msg: &str) {
        self.log_err(LogLevel::Warning, error, msg);
    }

    pub fn error_err(&self, error: &dyn Error, msg: &str) {
        self.log_err(LogLevel::Error, error, msg);
    }

    fn write(&self, level: LogLevel, msg: &str, error: Option<String>) {
        let thread_name = if self.core.env_mask.is_set(EnvResource::ThreadName) {
            Some(
                std::thread::current()
                    .name()
                    .unwrap_or("unnamed")
                    .to_string(),
            )
        } else {
            None
        };
        self.core.queue.push(LogMessage {
            timestamp: Utc::now(),
            level,
            msg: msg.to_string(),
            error,
            logger_name: self.core.name.clone(),
            thread_name,
            appenders: Arc::clone(&self.core.appenders),
        });
    }
}

/// Render an error and its `source()` chain, one cause per line.
pub fn render_error_chain(error: &dyn Error) -> String {
    let mut out = String::new();
    let _ = write!(out, "{error}");
    let mut cause = error.source();
    while let Some(err) = cause {
        let _ = write!(out, "\ncaused by: {err}");
        cause = err.source();
    }
    out
}
