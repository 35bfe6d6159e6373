use anyhow::{Result, anyhow};
use console::{Color, style};
use log::{Level, LevelFilter, Log, Metadata, Record, set_boxed_logger, set_max_level};
use std::io::{Write, stderr};

/// The main logging facade
pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    /// Create a new logger
    pub fn new(level: LevelFilter) -> Box<Self> {
        Self { level }.into()
    }

    /// Install the logger globally for the provided level
    pub fn init(level: LevelFilter) -> Result<()> {
        set_boxed_logger(Self::new(level)).map_err(|e| anyhow!("Unable to set logger: {}", e))?;
        set_max_level(level);
        Ok(())
    }

    /// Format a message the way every log line is formatted
    pub fn format(level: Level, msg: &str) -> String {
        let (level_name, level_color) = match level {
            Level::Error => ("ERROR", Color::Red),
            Level::Warn => ("WARN ", Color::Yellow),
            Level::Info => ("INFO ", Color::Green),
            Level::Debug => ("DEBUG", Color::Cyan),
            Level::Trace => ("TRACE", Color::Magenta),
        };
        format!(
            "{}{}{} {}",
            style("[").white().dim(),
            style(level_name).fg(level_color),
            style("]").white().dim(),
            msg,
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = Self::format(record.level(), &record.args().to_string());
        writeln!(stderr(), "{}", msg).ok();
    }

    fn flush(&self) {}
}
