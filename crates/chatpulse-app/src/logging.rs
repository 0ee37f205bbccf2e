use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_PREFIX: &str = "chatpulse-";
pub const LOG_FILE_SUFFIX: &str = ".log";
pub const LOG_RETENTION_DAYS: i64 = 30;

fn default_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}

/// Log to `<data_dir>/logs/chatpulse-YYYY-MM-DD-HH.log`, one file per hour.
pub fn init_logging(data_dir: &str) -> Result<()> {
    let log_dir = PathBuf::from(data_dir).join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    cleanup_old_logs(&log_dir, Utc::now(), LOG_RETENTION_DAYS)?;

    let writer = HourlyFileWriter::open(log_dir, LOG_RETENTION_DAYS)?;
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(())
}

pub fn init_console_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .init();
}

#[derive(Debug)]
struct OpenHour {
    key: String,
    file: File,
}

#[derive(Clone, Debug)]
struct HourlyFileWriter {
    log_dir: PathBuf,
    retention_days: i64,
    current: Arc<Mutex<OpenHour>>,
}

impl HourlyFileWriter {
    fn open(log_dir: PathBuf, retention_days: i64) -> Result<Self> {
        let key = hour_key(Utc::now());
        let file = open_hour_file(&log_dir, &key)
            .with_context(|| format!("Failed to open log file in {}", log_dir.display()))?;
        Ok(Self {
            log_dir,
            retention_days,
            current: Arc::new(Mutex::new(OpenHour { key, file })),
        })
    }

    fn with_current_file<T>(&self, f: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let now = Utc::now();
        let key = hour_key(now);
        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        if current.key != key {
            current.file.flush()?;
            current.file = open_hour_file(&self.log_dir, &key)?;
            current.key = key;
            let _ = cleanup_old_logs(&self.log_dir, now, self.retention_days);
        }
        f(&mut current.file)
    }
}

impl<'a> MakeWriter<'a> for HourlyFileWriter {
    type Writer = HourlyFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for HourlyFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_current_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_current_file(|file| file.flush())
    }
}

fn hour_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H").to_string()
}

fn open_hour_file(log_dir: &Path, hour: &str) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(format!("{LOG_FILE_PREFIX}{hour}{LOG_FILE_SUFFIX}")))
}

fn parse_log_filename_time(file_name: &str) -> Option<DateTime<Utc>> {
    let hour = file_name
        .strip_prefix(LOG_FILE_PREFIX)?
        .strip_suffix(LOG_FILE_SUFFIX)?;
    let naive =
        NaiveDateTime::parse_from_str(&format!("{hour}:00:00"), "%Y-%m-%d-%H:%M:%S").ok()?;
    Some(naive.and_utc())
}

/// Remove hourly log files older than `retention_days`. Other files are left alone.
pub fn cleanup_old_logs(log_dir: &Path, now: DateTime<Utc>, retention_days: i64) -> Result<()> {
    let cutoff = now - Duration::days(retention_days);
    let entries = match fs::read_dir(log_dir) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", log_dir.display())),
    };

    for entry in entries {
        let path = entry?.path();
        let expired = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_log_filename_time)
            .is_some_and(|logged_at| logged_at < cutoff);
        if expired && path.is_file() {
            let _ = fs::remove_file(&path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_dir() -> PathBuf {
        std::env::temp_dir().join(format!("chatpulse_logging_test_{}", Uuid::new_v4()))
    }

    #[test]
    fn test_parse_log_filename_time() {
        assert!(parse_log_filename_time("chatpulse-2026-02-08-10.log").is_some());
        assert!(parse_log_filename_time("chatpulse-2026-02-08.log").is_none());
        assert!(parse_log_filename_time("other-2026-02-08-10.log").is_none());
    }

    #[test]
    fn test_cleanup_old_logs_keeps_recent_and_foreign_files() {
        let dir = test_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("chatpulse-2025-01-01-00.log"), "old").unwrap();
        fs::write(dir.join("chatpulse-2026-02-08-10.log"), "new").unwrap();
        fs::write(dir.join("notes.txt"), "keep").unwrap();

        let now = DateTime::parse_from_rfc3339("2026-02-08T11:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        cleanup_old_logs(&dir, now, 30).unwrap();

        assert!(!dir.join("chatpulse-2025-01-01-00.log").exists());
        assert!(dir.join("chatpulse-2026-02-08-10.log").exists());
        assert!(dir.join("notes.txt").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cleanup_missing_dir_is_ok() {
        assert!(cleanup_old_logs(&test_dir(), Utc::now(), 30).is_ok());
    }

    #[test]
    fn test_hourly_writer_appends_to_current_hour_file() {
        let dir = test_dir();
        fs::create_dir_all(&dir).unwrap();
        let mut writer = HourlyFileWriter::open(dir.clone(), 30).unwrap();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let key = writer.current.lock().unwrap().key.clone();
        let path = dir.join(format!("{LOG_FILE_PREFIX}{key}{LOG_FILE_SUFFIX}"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello\n");
        let _ = fs::remove_dir_all(&dir);
    }
}
