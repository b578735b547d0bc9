//! File appender with size/time rolling.
//!
//! Records append to the configured path, flushed per record. When rolling
//! is enabled the file is checked after a write (at most every 30 seconds
//! for size-based rolling) and, once over the limit, renamed to
//! `<name>_YYYY-MM-dd_HH-mm-ss` and reopened fresh. Rolled files can be
//! gzip-compressed on a helper thread, and the set of rolled files can be
//! pruned down to `preserve_num` entries.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use flate2::Compression;
use flate2::write::GzEncoder;
use regex::Regex;

use crate::config::FileParams;
use crate::error::LogError;
use crate::level::LogLevel;
use crate::message::{EnvMask, LogMessage};
use crate::pattern::Pattern;

use super::Appender;

const ROLL_CHECK_INTERVAL: Duration = Duration::from_secs(30);
/// Slack added past a time-based deadline so the roll lands after it.
const ROLL_SETTLE: Duration = Duration::from_secs(3);

pub struct FileAppender {
    pattern: Pattern,
    level: Option<LogLevel>,
    params: FileParams,
    file: BufWriter<File>,
    created: SystemTime,
    next_check: Option<SystemTime>,
    check_rolling: bool,
    rolled_files: Regex,
    compress_worker: Option<JoinHandle<()>>,
}

impl FileAppender {
    pub fn open(
        pattern: Pattern,
        level: Option<LogLevel>,
        params: FileParams,
    ) -> Result<FileAppender, LogError> {
        let file = open_file(&params.path)?;
        let created = file_created(&params.path);
        let check_rolling = params.max_size.is_some() || params.max_time.is_some();
        let rolled_files = rolled_files_regex(&params)?;
        Ok(FileAppender {
            pattern,
            level,
            params,
            file,
            created,
            next_check: None,
            check_rolling,
            rolled_files,
            compress_worker: None,
        })
    }

    fn write_record(&mut self, msg: &LogMessage) -> io::Result<()> {
        writeln!(self.file, "{}", self.pattern.format(msg))?;
        if let Some(error) = &msg.error {
            writeln!(self.file, "{error}")?;
        }
        self.file.flush()
    }

    fn check_roll(&mut self, now: SystemTime) -> io::Result<()> {
        let mut do_roll = match self.params.max_size {
            Some(max) => fs::metadata(&self.params.path)?.len() >= max,
            None => false,
        };
        if !do_roll {
            if let Some(max_time) = self.params.max_time {
                do_roll = self.created + max_time <= now;
            }
        }

        if do_roll {
            self.roll()?;
        }

        self.next_check = Some(if self.params.max_size.is_some() {
            now + ROLL_CHECK_INTERVAL
        } else {
            self.created + self.params.max_time.unwrap_or_default() + ROLL_SETTLE
        });
        Ok(())
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let path = self.params.path.clone();
        let stamp = DateTime::<Local>::from(self.created)
            .format("_%Y-%m-%d_%H-%M-%S")
            .to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rolled = path.with_file_name(format!("{file_name}{stamp}"));
        fs::rename(&path, &rolled)?;

        if self.params.compress_old {
            self.spawn_compress(rolled);
        } else if let Some(keep) = self.params.preserve_num {
            prune_rolled(&self.parent_dir(), &self.rolled_files, keep);
        }

        self.file = open_file_raw(&path)?;
        self.created = file_created(&path);
        Ok(())
    }

    fn parent_dir(&self) -> PathBuf {
        self.params
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn spawn_compress(&mut self, rolled: PathBuf) {
        // block if the previous compression is still in progress
        if let Some(handle) = self.compress_worker.take() {
            let _ = handle.join();
        }
        let dir = self.parent_dir();
        let rolled_files = self.rolled_files.clone();
        let preserve = self.params.preserve_num;
        self.compress_worker = Some(thread::spawn(move || {
            if let Err(e) = compress(&rolled) {
                eprintln!("nelum-log: compressing {}: {e}", rolled.display());
                return;
            }
            if let Some(keep) = preserve {
                prune_rolled(&dir, &rolled_files, keep);
            }
        }));
    }
}

impl Appender for FileAppender {
    fn append(&mut self, msg: &LogMessage) {
        if let Err(e) = self.write_record(msg) {
            eprintln!(
                "nelum-log: file appender {}: {e}",
                self.params.path.display()
            );
        }
        if self.check_rolling {
            let now = SystemTime::now();
            if self.next_check.is_none_or(|at| at <= now) {
                if let Err(e) = self.check_roll(now) {
                    eprintln!(
                        "nelum-log: rolling {}: {e}",
                        self.params.path.display()
                    );
                }
            }
        }
    }

    fn threshold(&self) -> Option<LogLevel> {
        self.level
    }

    fn env_mask(&self) -> EnvMask {
        self.pattern.env_mask()
    }

    fn close(&mut self) {
        if self.check_rolling {
            let _ = self.check_roll(SystemTime::now());
        }
        let _ = self.file.flush();
        if let Some(handle) = self.compress_worker.take() {
            let _ = handle.join();
        }
    }
}

fn open_file(path: &Path) -> Result<BufWriter<File>, LogError> {
    open_file_raw(path).map_err(|e| {
        LogError::Config(format!("cannot open log file {}: {e}", path.display()))
    })
}

fn open_file_raw(path: &Path) -> io::Result<BufWriter<File>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(BufWriter::new)
}

/// Creation time of the live log file; falls back to mtime, then to now,
/// on filesystems that track neither.
fn file_created(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.created().or_else(|_| m.modified()))
        .unwrap_or_else(|_| SystemTime::now())
}

/// Matches the names this appender gives to rolled files.
fn rolled_files_regex(params: &FileParams) -> Result<Regex, LogError> {
    let file_name = params
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut pattern = format!(
        r"^{}_\d{{4}}-\d{{2}}-\d{{2}}_\d{{2}}-\d{{2}}-\d{{2}}",
        regex::escape(&file_name)
    );
    if params.compress_old {
        pattern.push_str(r"\.gz");
    }
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| LogError::Config(format!("rolled-file pattern for '{file_name}': {e}")))
}

fn compress(path: &Path) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let gz_path = path.with_file_name(format!("{file_name}.gz"));
    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    fs::remove_file(path)
}

/// Delete the oldest rolled files until at most `keep` remain.
fn prune_rolled(dir: &Path, rolled_files: &Regex, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut rolled: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !rolled_files.is_match(name) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        rolled.push((modified, entry.path()));
    }
    rolled.sort_by_key(|(modified, _)| *modified);
    while rolled.len() > keep {
        let (_, path) = rolled.remove(0);
        let _ = fs::remove_file(path);
    }
}
