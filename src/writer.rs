//! `io::Write` adapter that turns a byte stream into log records.
//!
//! Useful for pointing a child process's stderr, or any line-oriented
//! writer, at the pipeline: every complete line becomes one record at a
//! fixed level. Partial lines are buffered until their newline arrives; a
//! trailing unterminated line is logged when the writer is dropped.

use std::io;

use crate::level::LogLevel;
use crate::logger::Logger;

pub struct LogWriter {
    logger: Logger,
    level: LogLevel,
    buf: Vec<u8>,
}

impl LogWriter {
    pub fn new(logger: Logger, level: LogLevel) -> LogWriter {
        LogWriter {
            logger,
            level,
            buf: Vec::new(),
        }
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            let trimmed = text.trim_end_matches('\r');
            if !trimmed.is_empty() {
                self.logger.log(self.level, trimmed);
            }
        }
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        self.drain_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // complete lines only; a partial line keeps waiting for its newline
        self.drain_lines();
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.drain_lines();
        if !self.buf.is_empty() {
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            self.logger.log(self.level, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LoggerCore;
    use crate::message::{EnvMask, LogMessage};
    use crate::queue::LogQueue;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup(level: LogLevel) -> (Arc<LogQueue<LogMessage>>, LogWriter) {
        let queue = Arc::new(LogQueue::new(64, true, Duration::from_millis(10)));
        let logger = Logger::from_core(Arc::new(LoggerCore {
            name: "STDERR".into(),
            threshold: LogLevel::Trace,
            appenders: Arc::new(Vec::new()),
            env_mask: EnvMask::default(),
            queue: Arc::clone(&queue),
        }));
        (Arc::clone(&queue), LogWriter::new(logger, level))
    }

    fn drain(queue: &LogQueue<LogMessage>) -> Vec<String> {
        queue.stop();
        let mut out = Vec::new();
        while let Some(msg) = queue.pop(|| {}) {
            out.push(msg.msg);
        }
        out
    }

    #[test]
    fn complete_lines_become_records() {
        let (queue, mut writer) = setup(LogLevel::Error);
        writer.write_all(b"first line\nsecond line\n").unwrap();
        drop(writer);
        assert_eq!(drain(&queue), vec!["first line", "second line"]);
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let (queue, mut writer) = setup(LogLevel::Error);
        writer.write_all(b"part").unwrap();
        writer.flush().unwrap();
        writer.write_all(b"ial\n").unwrap();
        drop(writer);
        assert_eq!(drain(&queue), vec!["partial"]);
    }

    #[test]
    fn trailing_line_logged_on_drop() {
        let (queue, mut writer) = setup(LogLevel::Error);
        writer.write_all(b"no newline at end").unwrap();
        drop(writer);
        assert_eq!(drain(&queue), vec!["no newline at end"]);
    }

    #[test]
    fn blank_lines_skipped() {
        let (queue, mut writer) = setup(LogLevel::Error);
        writer.write_all(b"\n\nreal\r\n\n").unwrap();
        drop(writer);
        assert_eq!(drain(&queue), vec!["real"]);
    }

    #[test]
    fn records_carry_the_fixed_level() {
        let (queue, mut writer) = setup(LogLevel::Warning);
        writer.write_all(b"careful\n").unwrap();
        drop(writer);
        queue.stop();
        let msg = queue.pop(|| {}).expect("record queued");
        assert_eq!(msg.level, LogLevel::Warning);
    }
}
