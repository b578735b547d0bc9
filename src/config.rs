//! Logging configuration: JSON documents, resolved types, logger resolution.
//!
//! A configuration document has three sections, all optional:
//!
//! ```json
//! {
//!     "settings": { "queueSize": 10000, "queueCheckInterval": 100, "overflowBlocks": true },
//!     "appenders": {
//!         "console": { "type": "console", "target": "stdout", "level": "trace" },
//!         "file": { "type": "file", "path": "/var/log/app.log", "maxSize": "100M", "maxTime": "1d" }
//!     },
//!     "loggers": {
//!         "root": { "level": "debug", "appenders": ["console", "file"] },
//!         "my.noisy.module": { "level": "warning" }
//!     }
//! }
//! ```
//!
//! Parsing goes through a private serde `Raw*` shape, then resolves into the
//! owned public types below: level and target strings are checked, size and
//! duration strings parsed, file paths `~`-expanded, and appender references
//! verified against the registered appender set.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::error::LogError;
use crate::level::LogLevel;
use crate::name::LoggerName;

/// Layout used when an appender does not set its own.
pub const DEFAULT_PATTERN: &str = "%{time:%H:%M:%S%.3f} [%thread] %{level:-5} %logger - %msg";

// ── resolved types ────────────────────────────────────────────────────────────

/// Queue tuning shared by the whole pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Capacity of the record queue.
    pub queue_size: usize,
    /// How often the idle appender worker runs housekeeping.
    pub queue_check_interval: Duration,
    /// Full queue: `true` blocks the logging call, `false` discards.
    pub overflow_blocks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            queue_size: default_queue_size(),
            queue_check_interval: Duration::from_millis(default_queue_check_interval_ms()),
            overflow_blocks: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl FromStr for ConsoleTarget {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("stdout") {
            Ok(ConsoleTarget::Stdout)
        } else if s.eq_ignore_ascii_case("stderr") {
            Ok(ConsoleTarget::Stderr)
        } else {
            Err(LogError::Config(format!(
                "unrecognised console appender target: '{s}'"
            )))
        }
    }
}

/// File appender parameters.
#[derive(Debug, Clone)]
pub struct FileParams {
    /// Log file path, `~` already expanded.
    pub path: PathBuf,
    /// Roll when the file reaches this many bytes.
    pub max_size: Option<u64>,
    /// Roll when the file is older than this.
    pub max_time: Option<Duration>,
    /// Gzip rolled files.
    pub compress_old: bool,
    /// Keep at most this many rolled files.
    pub preserve_num: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum AppenderKind {
    Console { target: ConsoleTarget },
    File(FileParams),
}

#[derive(Debug, Clone)]
pub struct AppenderConfig {
    pub name: String,
    pub kind: AppenderKind,
    /// Layout override; [`DEFAULT_PATTERN`] when absent.
    pub pattern: Option<String>,
    /// Appender-side threshold; no filtering when absent.
    pub level: Option<LogLevel>,
}

/// One named logger entry ("LoggerConfig" at the bootstrap surface).
#[derive(Debug, Clone)]
pub struct LoggerEntry {
    pub name: LoggerName,
    pub level: Option<LogLevel>,
    /// Appender names, resolved against the registered appender set.
    pub appenders: Vec<String>,
    /// `false` replaces inherited appenders instead of adding to them.
    pub additive_appenders: bool,
}

impl LoggerEntry {
    pub fn new(name: impl Into<LoggerName>) -> LoggerEntry {
        LoggerEntry {
            name: name.into(),
            level: None,
            appenders: Vec::new(),
            additive_appenders: true,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> LoggerEntry {
        self.level = Some(level);
        self
    }

    pub fn with_appenders(mut self, appenders: Vec<String>) -> LoggerEntry {
        self.appenders = appenders;
        self
    }

    pub fn non_additive(mut self) -> LoggerEntry {
        self.additive_appenders = false;
        self
    }
}

/// Effective parameters of one logger after prefix resolution.
#[derive(Debug, Clone)]
pub struct LoggerParams {
    pub level: LogLevel,
    pub appenders: Vec<String>,
}

/// Fully resolved logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfiguration {
    pub settings: Settings,
    pub appenders: Vec<AppenderConfig>,
    pub loggers: BTreeMap<LoggerName, LoggerEntry>,
}

impl LogConfiguration {
    /// Production default: one console appender and a root logger at
    /// `threshold`, nothing else.
    pub fn default_config(target: ConsoleTarget, threshold: LogLevel) -> LogConfiguration {
        let appender = AppenderConfig {
            name: "console".to_string(),
            kind: AppenderKind::Console { target },
            pattern: Some(DEFAULT_PATTERN.to_string()),
            level: Some(threshold),
        };
        let root = LoggerEntry::new(LoggerName::root())
            .with_level(threshold)
            .with_appenders(vec![appender.name.clone()]);
        let mut loggers = BTreeMap::new();
        loggers.insert(root.name.clone(), root);
        LogConfiguration {
            settings: Settings::default(),
            appenders: vec![appender],
            loggers,
        }
    }

    pub fn from_json(json: &str) -> Result<LogConfiguration, LogError> {
        let raw: RawConfig = serde_json::from_str(json)
            .map_err(|e| LogError::Config(format!("parse error: {e}")))?;
        resolve_raw(raw)
    }

    pub fn from_json_reader(mut reader: impl Read) -> Result<LogConfiguration, LogError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        LogConfiguration::from_json(&buf)
    }

    pub fn from_json_file(path: &Path) -> Result<LogConfiguration, LogError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| LogError::Config(format!("cannot read {}: {e}", path.display())))?;
        LogConfiguration::from_json(&raw)
    }

    /// Infer the parameters of `name` from the configuration tree.
    ///
    /// Walks the name's prefixes from the root to the full name. The most
    /// specific configured level wins; appenders accumulate along the walk
    /// unless an entry is non-additive, which replaces the inherited set.
    pub fn resolve(&self, name: &LoggerName) -> LoggerParams {
        let mut level = LogLevel::MIN;
        let mut appenders: Vec<String> = Vec::new();

        for i in 0..=name.len() {
            let Some(entry) = self.loggers.get(&name.prefix(i)) else {
                continue;
            };
            if let Some(entry_level) = entry.level {
                level = entry_level;
            }
            if !entry.additive_appenders {
                appenders.clear();
            }
            appenders.extend(entry.appenders.iter().cloned());
        }

        LoggerParams { level, appenders }
    }
}

// ── raw document shape ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    settings: RawSettings,
    #[serde(default)]
    appenders: BTreeMap<String, RawAppender>,
    #[serde(default)]
    loggers: BTreeMap<String, RawLogger>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    #[serde(default = "default_queue_size")]
    queue_size: usize,
    /// Milliseconds.
    #[serde(default = "default_queue_check_interval_ms")]
    queue_check_interval: u64,
    #[serde(default = "default_true")]
    overflow_blocks: bool,
}

impl Default for RawSettings {
    fn default() -> Self {
        RawSettings {
            queue_size: default_queue_size(),
            queue_check_interval: default_queue_check_interval_ms(),
            overflow_blocks: default_true(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppender {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    // console
    #[serde(default)]
    target: Option<String>,
    // file
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    max_size: Option<String>,
    #[serde(default)]
    max_time: Option<String>,
    #[serde(default = "default_false")]
    compress_old: bool,
    #[serde(default)]
    preserve_num: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogger {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    appenders: Vec<String>,
    #[serde(default = "default_true")]
    additive_appenders: bool,
}

fn default_queue_size() -> usize {
    10_000
}

fn default_queue_check_interval_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

// ── resolution ────────────────────────────────────────────────────────────────

fn resolve_raw(raw: RawConfig) -> Result<LogConfiguration, LogError> {
    let settings = Settings {
        queue_size: raw.settings.queue_size,
        queue_check_interval: Duration::from_millis(raw.settings.queue_check_interval),
        overflow_blocks: raw.settings.overflow_blocks,
    };

    let mut appenders = Vec::with_capacity(raw.appenders.len());
    for (name, appender) in raw.appenders {
        appenders.push(resolve_appender(name, appender)?);
    }

    let mut loggers = BTreeMap::new();
    for (key, logger) in raw.loggers {
        let name = LoggerName::from_config_key(&key);
        for appender in &logger.appenders {
            if !appenders.iter().any(|a| &a.name == appender) {
                return Err(LogError::Config(format!(
                    "unregistered appender '{appender}' referenced from logger '{key}'"
                )));
            }
        }
        let entry = LoggerEntry {
            name: name.clone(),
            level: logger.level.as_deref().map(LogLevel::from_str).transpose()?,
            appenders: logger.appenders,
            additive_appenders: logger.additive_appenders,
        };
        loggers.insert(name, entry);
    }

    Ok(LogConfiguration {
        settings,
        appenders,
        loggers,
    })
}

fn resolve_appender(name: String, raw: RawAppender) -> Result<AppenderConfig, LogError> {
    let level = raw.level.as_deref().map(LogLevel::from_str).transpose()?;

    let kind = if raw.kind.eq_ignore_ascii_case("console") {
        let target = raw.target.as_deref().ok_or_else(|| {
            LogError::Config(format!(
                "target must be specified for console appender '{name}'"
            ))
        })?;
        AppenderKind::Console {
            target: target.parse()?,
        }
    } else if raw.kind.eq_ignore_ascii_case("file") {
        let path = raw.path.as_deref().ok_or_else(|| {
            LogError::Config(format!("path must be specified for file appender '{name}'"))
        })?;
        AppenderKind::File(FileParams {
            path: expand_home(path),
            max_size: raw.max_size.as_deref().map(parse_size).transpose()?,
            max_time: raw.max_time.as_deref().map(parse_duration).transpose()?,
            compress_old: raw.compress_old,
            preserve_num: raw.preserve_num,
        })
    } else {
        return Err(LogError::Config(format!(
            "unrecognised appender type '{}' for appender '{name}'",
            raw.kind
        )));
    };

    Ok(AppenderConfig {
        name,
        kind,
        pattern: raw.pattern,
        level,
    })
}

// ── value parsing ─────────────────────────────────────────────────────────────

/// Parse a byte size with an optional `k`/`m`/`g` suffix: `"100M"`, `"10k"`.
pub fn parse_size(s: &str) -> Result<u64, LogError> {
    if s.is_empty() {
        return Err(LogError::Config("empty string for size".into()));
    }

    let (digits, factor) = match s.chars().last() {
        Some('k') | Some('K') => (&s[..s.len() - 1], 1024u64),
        Some('m') | Some('M') => (&s[..s.len() - 1], 1024 * 1024),
        Some('g') | Some('G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1),
    };
    let base = digits
        .parse::<u64>()
        .map_err(|_| LogError::Config(format!("invalid size: '{s}'")))?;
    Ok(base * factor)
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d+)[dD])?\s*(?:(\d+)[hH])?\s*(?:(\d+)[mM])?\s*(?:(\d+)[sS])?\s*$")
            .unwrap()
    })
}

/// Parse a duration like `"1d 12h 30m 15s"`; every component is optional.
pub fn parse_duration(s: &str) -> Result<Duration, LogError> {
    let caps = duration_regex()
        .captures(s)
        .ok_or_else(|| LogError::Config(format!("invalid duration: '{s}'")))?;

    let component = |idx: usize| -> Result<u64, LogError> {
        match caps.get(idx) {
            Some(m) => m
                .as_str()
                .parse::<u64>()
                .map_err(|_| LogError::Config(format!("invalid duration: '{s}'"))),
            None => Ok(0),
        }
    };

    let days = component(1)?;
    let hours = component(2)?;
    let minutes = component(3)?;
    let seconds = component(4)?;
    Ok(Duration::from_secs(
        ((days * 24 + hours) * 60 + minutes) * 60 + seconds,
    ))
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
