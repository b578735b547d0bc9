//! Pipeline manager: owns the record queue, the appender worker thread, and
//! the logger cache.
//!
//! Construction builds every configured appender up front (a malformed
//! layout or an unwritable log file fails the whole setup) and starts one
//! worker thread that owns the appenders for the life of the pipeline.
//! [`LogManager::shutdown`] stops the queue, drains what was already
//! accepted, closes the appenders, and joins the worker.
//!
//! A manager is normally threaded explicitly through the program as a
//! handle. The process-global slot ([`init_global`]/[`global`]) exists for
//! the two consumers that need ambient access: the unit-test bootstrap and
//! the `log` facade bridge.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::appender::{self, Appender};
use crate::config::LogConfiguration;
use crate::error::LogError;
use crate::level::LogLevel;
use crate::logger::{Logger, LoggerCore};
use crate::message::{EnvMask, LogMessage};
use crate::name::LoggerName;
use crate::queue::LogQueue;

/// How often the worker sweeps dropped loggers out of the cache.
const LOGGERS_CLEANUP_PERIOD: Duration = Duration::from_secs(20);

/// Per-appender data the manager keeps after handing the appenders to the
/// worker: enough to compute logger thresholds and capture masks.
struct AppenderMeta {
    env_mask: EnvMask,
    level: Option<LogLevel>,
}

type LoggerCache = Arc<Mutex<HashMap<String, Weak<LoggerCore>>>>;

pub struct LogManager {
    config: LogConfiguration,
    queue: Arc<LogQueue<LogMessage>>,
    meta: BTreeMap<String, AppenderMeta>,
    loggers: LoggerCache,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl LogManager {
    pub fn new(config: LogConfiguration) -> Result<LogManager, LogError> {
        let queue = Arc::new(LogQueue::new(
            config.settings.queue_size,
            config.settings.overflow_blocks,
            config.settings.queue_check_interval,
        ));

        let mut appenders: BTreeMap<String, Box<dyn Appender>> = BTreeMap::new();
        let mut meta = BTreeMap::new();
        for appender_config in &config.appenders {
            let appender = appender::create(appender_config)?;
            meta.insert(
                appender_config.name.clone(),
                AppenderMeta {
                    env_mask: appender.env_mask(),
                    level: appender_config.level,
                },
            );
            appenders.insert(appender_config.name.clone(), appender);
        }

        let loggers: LoggerCache = Arc::new(Mutex::new(HashMap::new()));
        let worker_queue = Arc::clone(&queue);
        let worker_loggers = Arc::clone(&loggers);
        let worker = thread::Builder::new()
            .name("nelum-log-appender".into())
            .spawn(move || worker_loop(worker_queue, appenders, worker_loggers))?;

        Ok(LogManager {
            config,
            queue,
            meta,
            loggers,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Get (or create) the logger for `name`. Loggers are cached by name
    /// and held weakly, so a logger nobody references any more is rebuilt
    /// on the next request instead of accumulating forever.
    pub fn logger(&self, name: &str) -> Logger {
        let mut cache = self
            .loggers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(core) = cache.get(name).and_then(Weak::upgrade) {
            return Logger::from_core(core);
        }
        let core = Arc::new(self.create_logger(name));
        cache.insert(name.to_string(), Arc::downgrade(&core));
        Logger::from_core(core)
    }

    /// Stop accepting records, flush what was queued, close appenders, and
    /// join the worker. Safe to call more than once.
    pub fn shutdown(&self) {
        self.queue.stop();
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn create_logger(&self, name: &str) -> LoggerCore {
        let params = self.config.resolve(&LoggerName::new(name));

        // The lowest appender-side threshold bounds how far down it is
        // useful to queue records; the logger's own level can only raise it.
        let mut level: Option<LogLevel> = None;
        for appender_name in &params.appenders {
            if let Some(meta) = self.meta.get(appender_name) {
                if let Some(appender_level) = meta.level {
                    if level.is_none_or(|current| appender_level < current) {
                        level = Some(appender_level);
                    }
                }
            }
        }
        let threshold = match level {
            Some(level) if params.level <= level => level,
            _ => params.level,
        };

        let mut env_mask = EnvMask::default();
        for appender_name in &params.appenders {
            if let Some(meta) = self.meta.get(appender_name) {
                env_mask.merge(meta.env_mask);
            }
        }

        LoggerCore {
            name: name.to_string(),
            threshold,
            appenders: Arc::new(params.appenders),
            env_mask,
            queue: Arc::clone(&self.queue),
        }
    }
}

impl Drop for LogManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    queue: Arc<LogQueue<LogMessage>>,
    mut appenders: BTreeMap<String, Box<dyn Appender>>,
    loggers: LoggerCache,
) {
    let mut last_cleanup = Instant::now();
    while let Some(msg) = queue.pop(|| {
        if last_cleanup.elapsed() >= LOGGERS_CLEANUP_PERIOD {
            last_cleanup = Instant::now();
            sweep_loggers(&loggers);
        }
    }) {
        for name in msg.appenders.iter() {
            if let Some(appender) = appenders.get_mut(name) {
                if appender.threshold().is_none_or(|t| msg.level >= t) {
                    appender.append(&msg);
                }
            }
        }
    }
    for appender in appenders.values_mut() {
        appender.close();
    }
}

fn sweep_loggers(loggers: &LoggerCache) {
    let mut cache = match loggers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    cache.retain(|_, core| core.strong_count() > 0);
}

// ── process-global slot ───────────────────────────────────────────────────────

static GLOBAL: OnceLock<LogManager> = OnceLock::new();

/// Install `config` as the process-global pipeline. Fails if one is already
/// installed; the loser's worker is shut down before returning.
pub fn init_global(config: LogConfiguration) -> Result<&'static LogManager, LogError> {
    if GLOBAL.get().is_some() {
        return Err(LogError::Init("global log manager already initialised".into()));
    }
    let manager = LogManager::new(config)?;
    match GLOBAL.set(manager) {
        Ok(()) => global().ok_or_else(|| LogError::Init("global slot empty after set".into())),
        Err(lost) => {
            lost.shutdown();
            Err(LogError::Init("global log manager already initialised".into()))
        }
    }
}

/// The process-global pipeline, if one was installed.
pub fn global() -> Option<&'static LogManager> {
    GLOBAL.get()
}
