//! Append-only transaction journal.
//!
//! Entries are queued in memory and written out only when [`Journal::flush`]
//! is called, so the point at which the file changes is always explicit.
//! While flushes keep failing the queue holds at most
//! [`MAX_PENDING_ENTRIES`], dropping the oldest entries first.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use tracing::warn;

/// Timestamp format of journal lines.
pub const JOURNAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default bound on entries waiting for a flush.
pub const MAX_PENDING_ENTRIES: usize = 1024;

/// A single recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Local time the operation completed, at second resolution.
    pub when: NaiveDateTime,
    /// Description of the operation.
    pub operation: String,
}

impl JournalEntry {
    fn line(&self) -> String {
        format!(
            "when {} : operation {}\n",
            self.when.format(JOURNAL_TIME_FORMAT),
            self.operation
        )
    }
}

/// Queue of pending entries bound to an optional journal file.
#[derive(Debug)]
pub struct Journal {
    path: Option<PathBuf>,
    pending: Vec<JournalEntry>,
    limit: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            path: None,
            pending: Vec::new(),
            limit: MAX_PENDING_ENTRIES,
        }
    }
}

impl Journal {
    /// Journal appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Journal that discards entries on flush.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Bound the pending queue to `limit` entries, at least one.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Target file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Queue an operation stamped with the current local time.
    pub fn record(&mut self, operation: impl Into<String>) {
        let now = Local::now().naive_local();
        self.record_at(now.with_nanosecond(0).unwrap_or(now), operation);
    }

    /// Queue an operation with an explicit timestamp.
    pub fn record_at(&mut self, when: NaiveDateTime, operation: impl Into<String>) {
        if self.pending.len() >= self.limit {
            let excess = self.pending.len() + 1 - self.limit;
            let dropped: Vec<_> = self.pending.drain(..excess).collect();
            if let Some(oldest) = dropped.first() {
                warn!(
                    dropped = dropped.len(),
                    oldest = %oldest.operation,
                    "journal queue full, dropping unflushed entries"
                );
            }
        }
        self.pending.push(JournalEntry {
            when,
            operation: operation.into(),
        });
    }

    /// Entries not yet written out.
    pub fn pending(&self) -> &[JournalEntry] {
        &self.pending
    }

    /// Append every pending entry to the journal file and return how many
    /// were written. On failure the entries stay queued.
    pub fn flush(&mut self) -> Result<usize> {
        let Some(path) = self.path.as_ref() else {
            let dropped = self.pending.len();
            self.pending.clear();
            return Ok(dropped);
        };
        if self.pending.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open journal {}", path.display()))?;

        let buffer: String = self.pending.iter().map(JournalEntry::line).collect();
        file.write_all(buffer.as_bytes())
            .with_context(|| format!("failed to append to journal {}", path.display()))?;

        let written = self.pending.len();
        self.pending.clear();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .expect("timestamp")
    }

    #[test]
    fn flush_appends_formatted_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("logs").join("transaction.txt");
        let mut journal = Journal::new(&path);

        journal.record_at(at(9, 0, 0), "add worker Ivan");
        journal.record_at(at(9, 0, 5), "delete train 42");
        assert_eq!(journal.flush()?, 2);
        assert!(journal.pending().is_empty());

        journal.record_at(at(10, 30, 0), "rename worker Ivan -> Petr");
        journal.flush()?;

        let contents = fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "when 2024-05-01 09:00:00 : operation add worker Ivan\n\
             when 2024-05-01 09:00:05 : operation delete train 42\n\
             when 2024-05-01 10:30:00 : operation rename worker Ivan -> Petr\n"
        );
        Ok(())
    }

    #[test]
    fn disabled_journal_discards_entries() -> Result<()> {
        let mut journal = Journal::disabled();
        journal.record("add train 42");
        assert_eq!(journal.pending().len(), 1);
        assert_eq!(journal.flush()?, 1);
        assert!(journal.pending().is_empty());
        assert!(journal.path().is_none());
        Ok(())
    }

    #[test]
    fn unflushed_queue_drops_oldest_entries() -> Result<()> {
        let dir = tempdir()?;
        // a directory in place of the file makes every flush fail
        let path = dir.path().join("transaction.txt");
        fs::create_dir(&path)?;
        let mut journal = Journal::new(&path).with_limit(2);

        journal.record_at(at(9, 0, 0), "add worker Ivan");
        assert!(journal.flush().is_err());
        journal.record_at(at(9, 0, 1), "add worker Petr");
        journal.record_at(at(9, 0, 2), "add worker Anna");
        assert!(journal.flush().is_err());

        let operations: Vec<_> = journal
            .pending()
            .iter()
            .map(|entry| entry.operation.as_str())
            .collect();
        assert_eq!(operations, ["add worker Petr", "add worker Anna"]);
        Ok(())
    }

    #[test]
    fn empty_flush_does_not_create_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("transaction.txt");
        let mut journal = Journal::new(&path);
        assert_eq!(journal.flush()?, 0);
        assert!(!path.exists());
        Ok(())
    }
}
