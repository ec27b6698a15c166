//! A stderr logger with timestamped lines.

use anyhow::Result;
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Installs the logger globally.
    pub fn init(level: LevelFilter) -> Result<()> {
        log::set_boxed_logger(Box::new(Self::new(level)))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
        log::debug!("logger initialized at {}", level);
        Ok(())
    }

    /// Maps `-v`/`-q` counts to a level. Warnings show by default.
    pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn format(record: &Record) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!("{} {} [{}] {}", timestamp, record.level(), record.target(), record.args())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A failed write to stderr has nowhere else to go.
            let _ = writeln!(std::io::stderr().lock(), "{}", Self::format(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
