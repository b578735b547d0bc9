//! Crate-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("config error: {0}")]
    Config(String),

    #[error("pattern error: {0}")]
    Pattern(String),

    #[error("init error: {0}")]
    Init(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = LogError::Config("missing appender type".into());
        assert!(!e.to_string().is_empty());
        assert!(e.to_string().contains("missing appender type"));
    }

    #[test]
    fn pattern_error_display() {
        let e = LogError::Pattern("unknown token".into());
        assert!(e.to_string().contains("unknown token"));
    }

    #[test]
    fn init_error_display() {
        let e = LogError::Init("already initialised".into());
        assert!(e.to_string().contains("already initialised"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: LogError = io_err.into();
        assert!(e.to_string().contains("io error"));
        // satisfies std::error::Error trait
        let _: &dyn Error = &e;
    }
}
