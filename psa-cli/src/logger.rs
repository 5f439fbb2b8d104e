//! Process-wide logger sink: a two-state (enabled, disabled) `log::Log`
//! implementation. When disabled (the default — `install` is simply never
//! called) every `log::` call in `psa_core` is a zero-cost no-op. When
//! enabled, every record is timestamped and written to both a log file and
//! standard out; the logger never influences algorithmic behavior.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

pub struct FileConsoleLogger {
    file: Mutex<File>,
}

impl FileConsoleLogger {
    fn new(path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl log::Log for FileConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Trace
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] {} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        );
        println!("{line}");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the sink and raises the global max level so every `log::` call
/// site actually reaches it. Called at most once, only when the CLI's
/// trailing `log` token is present.
pub fn install(path: &str) -> std::io::Result<()> {
    let logger = FileConsoleLogger::new(path)?;
    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(log::LevelFilter::Trace))
        .map_err(|e| std::io::Error::other(e.to_string()))
}
