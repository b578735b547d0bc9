//! Log records and the environment-capture mask.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::level::LogLevel;

/// Environment data a pattern layout can ask for.
///
/// Gathering some record fields costs something at the call site (querying
/// the current thread, for instance), so each pattern reports which of them
/// it actually renders and the logger only captures those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvResource {
    ThreadName,
}

impl EnvResource {
    fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Bitmask of [`EnvResource`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvMask(u32);

impl EnvMask {
    pub fn set(&mut self, resource: EnvResource) {
        self.0 |= resource.bit();
    }

    pub fn is_set(self, resource: EnvResource) -> bool {
        self.0 & resource.bit() != 0
    }

    pub fn merge(&mut self, other: EnvMask) {
        self.0 |= other.0;
    }
}

/// One log record, as queued between a logger and the appender worker.
#[derive(Debug, Clone)]
pub struct LogMessage {
    /// Capture time, UTC. Rendering converts to local time.
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub msg: String,
    /// Rendered error chain, one line per cause, if the record carries one.
    pub error: Option<String>,
    pub logger_name: String,
    /// Captured only when some appender's pattern renders `%thread`.
    pub thread_name: Option<String>,
    /// Names of the appenders this record is routed to. Shared with the
    /// originating logger, so queueing a record does not clone the list.
    pub appenders: Arc<Vec<String>>,
}

impl LogMessage {
    pub fn local_time(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_set_and_check() {
        let mut mask = EnvMask::default();
        assert!(!mask.is_set(EnvResource::ThreadName));
        mask.set(EnvResource::ThreadName);
        assert!(mask.is_set(EnvResource::ThreadName));
    }

    #[test]
    fn mask_merge() {
        let mut a = EnvMask::default();
        let mut b = EnvMask::default();
        b.set(EnvResource::ThreadName);
        a.merge(b);
        assert!(a.is_set(EnvResource::ThreadName));
    }
}
