//! Console appender: one line per record to stdout or stderr.

use std::io::Write;

use crate::config::ConsoleTarget;
use crate::level::LogLevel;
use crate::message::{EnvMask, LogMessage};
use crate::pattern::Pattern;

use super::Appender;

pub struct ConsoleAppender {
    pattern: Pattern,
    level: Option<LogLevel>,
    target: ConsoleTarget,
}

impl ConsoleAppender {
    pub fn new(pattern: Pattern, level: Option<LogLevel>, target: ConsoleTarget) -> ConsoleAppender {
        ConsoleAppender {
            pattern,
            level,
            target,
        }
    }

    fn write_record(&self, out: &mut impl Write, msg: &LogMessage) {
        // the console going away is not something the pipeline can act on
        let _ = writeln!(out, "{}", self.pattern.format(msg));
        if let Some(error) = &msg.error {
            let _ = writeln!(out, "{error}");
        }
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, msg: &LogMessage) {
        match self.target {
            ConsoleTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                self.write_record(&mut out, msg);
            }
            ConsoleTarget::Stderr => {
                let mut out = std::io::stderr().lock();
                self.write_record(&mut out, msg);
            }
        }
    }

    fn threshold(&self) -> Option<LogLevel> {
        self.level
    }

    fn env_mask(&self) -> EnvMask {
        self.pattern.env_mask()
    }
}
