use once_cell::sync::OnceCell;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

static SINK: OnceCell<LogSink> = OnceCell::new();

struct LogSink {
    dir: PathBuf,
    echo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Route log records to `<dir>/logs-YYYY-MM-DD.csv`. Only the first call wins.
pub fn init(dir: impl Into<PathBuf>, echo: bool) -> bool {
    let dir = dir.into();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("Could not create log directory {}: {}", dir.display(), e);
    }
    SINK.set(LogSink { dir, echo }).is_ok()
}

pub fn log_to_csv(level: Level, message: &str) {
    let now = chrono::Utc::now();

    let Some(sink) = SINK.get() else {
        eprintln!("[{}] {}", level.as_str(), message);
        return;
    };

    if sink.echo {
        eprintln!("[{}] {}", level.as_str(), message);
    }

    let filename = sink.dir.join(format!("logs-{}.csv", now.format("%Y-%m-%d")));

    if let Ok(file) = OpenOptions::new().append(true).create(true).open(&filename) {
        let mut writer = csv::Writer::from_writer(file);
        let timestamp = now.to_rfc3339();

        if writer
            .write_record([timestamp.as_str(), level.as_str(), message])
            .is_ok()
        {
            let _ = writer.flush();
        }
    } else {
        eprintln!("Could not open log file {}", filename.display());
    }
}

pub fn info(message: impl AsRef<str>) {
    log_to_csv(Level::Info, message.as_ref());
}

pub fn warn(message: impl AsRef<str>) {
    log_to_csv(Level::Warn, message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    log_to_csv(Level::Error, message.as_ref());
}
