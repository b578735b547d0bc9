//! Pattern layouts: compiled format templates for rendering log records.
//!
//! A layout string mixes literal text with `%ref` and `%{ref:format}`
//! tokens:
//!
//! - `%{time:FMT}` — record timestamp in local time, `FMT` a chrono
//!   strftime string (default `%Y-%m-%dT%H:%M:%S%.3f`)
//! - `%thread` — name of the thread that produced the record
//! - `%logger` — logger name
//! - `%level` — severity, `TRACE` .. `ERROR`
//! - `%msg` — message text
//! - `%n` — newline
//!
//! Non-time tokens accept a field width, `%{level:-5}`: `-5` pads to five
//! columns left-justified, `5` right-justified. Unknown tokens and invalid
//! time formats are rejected at construction, so a malformed layout fails
//! the whole setup rather than a single record.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::format::{Item, StrftimeItems};
use regex::Regex;

use crate::error::LogError;
use crate::message::{EnvMask, EnvResource, LogMessage};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(%\w+)|(%\{.+?\})").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    Time,
    Thread,
    Logger,
    Level,
    Message,
    NewLine,
}

impl Reference {
    fn by_name(name: &str) -> Result<Reference, LogError> {
        match name {
            "time" => Ok(Reference::Time),
            "thread" => Ok(Reference::Thread),
            "logger" => Ok(Reference::Logger),
            "level" => Ok(Reference::Level),
            "msg" => Ok(Reference::Message),
            "n" => Ok(Reference::NewLine),
            _ => Err(LogError::Pattern(format!("bad reference in pattern: {name}"))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pad {
    width: usize,
    left: bool,
}

fn parse_pad(spec: &str) -> Result<Pad, LogError> {
    let (left, digits) = match spec.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    let width = digits
        .parse::<usize>()
        .map_err(|_| LogError::Pattern(format!("invalid field width '{spec}' in pattern")))?;
    Ok(Pad { width, left })
}

fn validate_time_format(fmt: &str) -> Result<(), LogError> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(LogError::Pattern(format!("invalid time format '{fmt}' in pattern")));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct ParamDesc {
    reference: Reference,
    pad: Option<Pad>,
    time_format: String,
}

impl ParamDesc {
    fn new(name: &str, format: Option<&str>) -> Result<ParamDesc, LogError> {
        let reference = Reference::by_name(name)?;
        let mut desc = ParamDesc {
            reference,
            pad: None,
            time_format: String::new(),
        };
        match reference {
            Reference::Time => {
                let fmt = format.unwrap_or(DEFAULT_TIME_FORMAT);
                validate_time_format(fmt)?;
                desc.time_format = fmt.to_string();
            }
            _ => {
                if let Some(spec) = format {
                    desc.pad = Some(parse_pad(spec)?);
                }
            }
        }
        Ok(desc)
    }

    fn render(&self, out: &mut String, msg: &LogMessage) {
        let value = match self.reference {
            // format string validated at construction
            Reference::Time => msg.local_time().format(&self.time_format).to_string(),
            Reference::Thread => msg.thread_name.clone().unwrap_or_default(),
            Reference::Logger => msg.logger_name.clone(),
            Reference::Level => msg.level.as_str().to_string(),
            Reference::Message => msg.msg.clone(),
            Reference::NewLine => "\n".to_string(),
        };
        match self.pad {
            None => out.push_str(&value),
            Some(Pad { width, left: true }) => {
                let _ = write!(out, "{value:<width$}");
            }
            Some(Pad { width, left: false }) => {
                let _ = write!(out, "{value:>width$}");
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param(ParamDesc),
}

/// A compiled pattern layout.
#[derive(Debug, Clone)]
pub struct Pattern {
    segments: Vec<Segment>,
    env_mask: EnvMask,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Pattern, LogError> {
        let mut segments = Vec::new();
        let mut cur = 0;
        for m in token_regex().find_iter(pattern) {
            if m.start() > cur {
                segments.push(Segment::Literal(pattern[cur..m.start()].to_string()));
            }
            let token = m.as_str();
            let desc = match token.strip_prefix("%{").and_then(|t| t.strip_suffix('}')) {
                Some(body) => match body.split_once(':') {
                    Some((name, format)) => ParamDesc::new(name, Some(format))?,
                    None => ParamDesc::new(body, None)?,
                },
                None => ParamDesc::new(&token[1..], None)?,
            };
            if desc.reference == Reference::NewLine {
                segments.push(Segment::Literal("\n".to_string()));
            } else {
                segments.push(Segment::Param(desc));
            }
            cur = m.end();
        }
        if cur < pattern.len() {
            segments.push(Segment::Literal(pattern[cur..].to_string()));
        }

        let mut env_mask = EnvMask::default();
        for segment in &segments {
            if let Segment::Param(desc) = segment {
                if desc.reference == Reference::Thread {
                    env_mask.set(EnvResource::ThreadName);
                }
            }
        }

        Ok(Pattern { segments, env_mask })
    }

    /// Which environment data this layout renders.
    pub fn env_mask(&self) -> EnvMask {
        self.env_mask
    }

    /// Render one record to a line of text (no trailing newline).
    pub fn format(&self, msg: &LogMessage) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(desc) => desc.render(&mut out, msg),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn message(level: LogLevel, text: &str) -> LogMessage {
        LogMessage {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap(),
            level,
            msg: text.to_string(),
            error: None,
            logger_name: "my.test".to_string(),
            thread_name: Some("worker-1".to_string()),
            appenders: Arc::new(Vec::new()),
        }
    }

    #[test]
    fn literal_only_pattern() {
        let p = Pattern::new("plain text").unwrap();
        assert_eq!(p.format(&message(LogLevel::Info, "x")), "plain text");
    }

    #[test]
    fn basic_references() {
        let p = Pattern::new("[%thread] %level %logger - %msg").unwrap();
        assert_eq!(
            p.format(&message(LogLevel::Info, "hello")),
            "[worker-1] INFO my.test - hello"
        );
    }

    #[test]
    fn level_padding_left() {
        let p = Pattern::new("%{level:-5}|").unwrap();
        assert_eq!(p.format(&message(LogLevel::Info, "x")), "INFO |");
        // wider than the field, rendered unclipped
        assert_eq!(p.format(&message(LogLevel::Warning, "x")), "WARNING|");
    }

    #[test]
    fn level_padding_right() {
        let p = Pattern::new("%{level:7}|").unwrap();
        assert_eq!(p.format(&message(LogLevel::Info, "x")), "   INFO|");
    }

    #[test]
    fn time_reference_with_format() {
        let p = Pattern::new("%{time:%Y}").unwrap();
        let rendered = p.format(&message(LogLevel::Info, "x"));
        assert_eq!(rendered.len(), 4);
        assert!(rendered.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn newline_reference() {
        let p = Pattern::new("%msg%n").unwrap();
        assert_eq!(p.format(&message(LogLevel::Info, "a")), "a\n");
    }

    #[test]
    fn unknown_reference_rejected() {
        assert!(Pattern::new("%nope").is_err());
        assert!(Pattern::new("%{bogus:5}").is_err());
    }

    #[test]
    fn invalid_width_rejected() {
        assert!(Pattern::new("%{level:x}").is_err());
    }

    #[test]
    fn invalid_time_format_rejected() {
        assert!(Pattern::new("%{time:%Q}").is_err());
    }

    #[test]
    fn thread_reference_sets_env_mask() {
        let with_thread = Pattern::new("[%thread] %msg").unwrap();
        assert!(with_thread.env_mask().is_set(EnvResource::ThreadName));

        let without = Pattern::new("%level %msg").unwrap();
        assert!(!without.env_mask().is_set(EnvResource::ThreadName));
    }

    #[test]
    fn missing_thread_renders_empty() {
        let p = Pattern::new("[%thread]").unwrap();
        let mut msg = message(LogLevel::Info, "x");
        msg.thread_name = None;
        assert_eq!(p.format(&msg), "[]");
    }

    #[test]
    fn default_test_layout_compiles() {
        let p = Pattern::new("%{time:%H:%M:%S%.3f} [%thread] %{level:-5} %logger - %msg").unwrap();
        let line = p.format(&message(LogLevel::Debug, "ready"));
        assert!(line.contains("[worker-1] DEBUG my.test - ready"));
    }
}
