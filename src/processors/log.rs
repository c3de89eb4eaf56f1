use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Action records for a single run.
///
/// Every entry is echoed to stdout when recorded. The whole block is
/// appended to the log file once, at the end of the run.
#[derive(Debug)]
pub struct RunLog {
    started_at: DateTime<Local>,
    entries: Vec<String>,
    echo: bool,
}

impl RunLog {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            entries: Vec::new(),
            echo: true,
        }
    }

    /// A log that collects entries without printing them
    #[cfg(test)]
    pub fn silent(started_at: DateTime<Local>) -> Self {
        Self {
            echo: false,
            ..Self::new(started_at)
        }
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Print an action line and keep it for the log file
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            println!("{message}");
        }
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append this run's block to the log file, creating it if needed
    pub fn flush(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open run log: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "Run at {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        for entry in &self.entries {
            writeln!(writer, "{entry}")?;
        }
        writeln!(writer)?;

        writer
            .flush()
            .with_context(|| format!("Failed to write run log: {}", path.display()))?;
        Ok(())
    }
}
