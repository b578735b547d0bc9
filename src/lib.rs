//! nelum-log — asynchronous logging pipeline.
//!
//! Records flow from cheap, clonable [`Logger`] handles through a bounded
//! queue to a single appender worker thread that renders them with
//! compiled pattern layouts and writes them to console or file sinks.
//!
//! The pipeline is configured up front, from a JSON document or built in
//! code, and handed around as an explicit [`LogManager`] handle:
//!
//! ```no_run
//! use nelum_log::{ConsoleTarget, LogConfiguration, LogLevel, LogManager};
//!
//! # fn main() -> Result<(), nelum_log::LogError> {
//! let config = LogConfiguration::default_config(ConsoleTarget::Stderr, LogLevel::Info);
//! let manager = LogManager::new(config)?;
//! let log = manager.logger("app.startup");
//! log.info("pipeline ready");
//! manager.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! Unit-test suites use [`test_logging::init`] instead, which installs a
//! deterministic stdout configuration process-wide, exactly once.

pub mod appender;
pub mod config;
pub mod error;
#[cfg(feature = "facade-log")]
pub mod facade;
pub mod level;
pub mod logger;
pub mod manager;
pub mod message;
pub mod name;
pub mod pattern;
pub mod queue;
pub mod test_logging;
pub mod writer;

pub use config::{
    AppenderConfig, AppenderKind, ConsoleTarget, DEFAULT_PATTERN, LogConfiguration, LoggerEntry,
    LoggerParams, Settings,
};
pub use error::LogError;
pub use level::LogLevel;
pub use logger::Logger;
pub use manager::{LogManager, global, init_global};
pub use message::LogMessage;
pub use name::LoggerName;
pub use pattern::Pattern;
pub use writer::LogWriter;
