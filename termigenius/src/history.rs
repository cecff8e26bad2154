//! Command history, a local JSON-lines log of executed commands.
//!
//! Each line records the prompt, the command that ran, whether it succeeded
//! and how long it took. The file is pruned to the configured maximum,
//! dropping the oldest entries first.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

/// A single history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub prompt: String,
    pub command: String,
    pub success: bool,
    pub execution_time: f64,
    pub output_length: usize,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(
        prompt: &str,
        command: &str,
        success: bool,
        execution_time: f64,
        output_length: usize,
    ) -> Self {
        Self {
            timestamp: now_timestamp(),
            prompt: prompt.to_string(),
            command: command.to_string(),
            success,
            execution_time,
            output_length,
        }
    }
}

/// Aggregate numbers over the whole history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub successful: usize,
    /// Percentage of successful commands, `0.0` when empty
    pub success_rate: f64,
    pub average_execution_time: f64,
    pub most_recent: Option<String>,
}

/// History stored in a JSON-lines file
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    enabled: bool,
    max_entries: usize,
}

impl History {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, enabled: bool, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            enabled,
            max_entries,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry, pruning the oldest ones past the maximum.
    ///
    /// Does nothing when history is disabled.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written or JSON serialization fails.
    pub fn add_entry(&self, entry: &HistoryEntry) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(entry)?)?;
        drop(file);

        let entries = self.load()?;
        if entries.len() > self.max_entries {
            let keep = &entries[entries.len() - self.max_entries..];
            self.write_all(keep)?;
            debug!(pruned = entries.len() - keep.len(), "history pruned");
        }
        Ok(())
    }

    /// All entries, oldest first. Lines that fail to parse are skipped.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(line = idx + 1, error = %err, "skipping corrupt history line");
                    None
                }
            })
            .collect())
    }

    /// The `limit` most recent entries, oldest first.
    ///
    /// # Errors
    /// Returns an error if the history cannot be read.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self.load()?;
        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }

    /// Entries whose prompt or command contains `query`, ignoring case. The
    /// newest `limit` matches are returned, oldest first.
    ///
    /// # Errors
    /// Returns an error if the history cannot be read.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let query = query.to_lowercase();
        let matches: Vec<HistoryEntry> = self
            .load()?
            .into_iter()
            .filter(|e| {
                e.prompt.to_lowercase().contains(&query) || e.command.to_lowercase().contains(&query)
            })
            .collect();
        let start = matches.len().saturating_sub(limit);
        Ok(matches[start..].to_vec())
    }

    /// Remove every entry.
    ///
    /// # Errors
    /// Returns an error if the file cannot be removed.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the history cannot be read.
    pub fn stats(&self) -> Result<HistoryStats> {
        let entries = self.load()?;
        let total = entries.len();
        let successful = entries.iter().filter(|e| e.success).count();
        #[allow(clippy::cast_precision_loss)]
        let (success_rate, average_execution_time) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                successful as f64 / total as f64 * 100.0,
                entries.iter().map(|e| e.execution_time).sum::<f64>() / total as f64,
            )
        };
        Ok(HistoryStats {
            total,
            successful,
            success_rate,
            average_execution_time,
            most_recent: entries.last().map(|e| e.timestamp.clone()),
        })
    }

    fn write_all(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut content = String::new();
        for entry in entries {
            content.push_str(&serde_json::to_string(entry)?);
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Get the current timestamp in ISO 8601 format.
#[must_use]
pub fn now_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_timestamp(secs)
}

fn format_timestamp(secs: u64) -> String {
    let days = secs / 86400;
    let remaining = secs % 86400;
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    let (year, month, day) = epoch_days_to_date(days);
    format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}Z")
}

/// Convert epoch days to (year, month, day).
const fn epoch_days_to_date(days: u64) -> (u64, u64, u64) {
    // Howard Hinnant's civil_from_days
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}
