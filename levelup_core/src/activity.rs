//! Daily activity log.
//!
//! Completed workouts, check-ins, focus blocks and tasks are appended to a
//! JSONL (JSON Lines) file under an exclusive lock so that concurrent CLI
//! invocations never interleave partial lines.

use crate::{ActivityEntry, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for activity entries
pub trait ActivitySink {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()>;
}

/// JSONL-based activity sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivitySink for JsonlSink {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        // One write per line keeps the record whole even if we die mid-way
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Logged {} activity {}", entry.kind.as_str(), entry.id);
        Ok(())
    }
}

/// Read every entry from an activity log, skipping unreadable lines
pub fn read_entries(path: &Path) -> Result<Vec<ActivityEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ActivityEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable activity at line {}: {}",
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} activity entries from {:?}", entries.len(), path);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivityKind;
    use chrono::Utc;

    fn workout_entry(sets: u32) -> ActivityEntry {
        let mut entry = ActivityEntry::new(ActivityKind::Workout, Utc::now());
        entry.completed_sets = Some(sets);
        entry.xp_awarded = sets * 10;
        entry
    }

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("log").join("activity.log");

        let entry = workout_entry(12);
        let mut sink = JsonlSink::new(&log_path);
        sink.append(&entry).unwrap();
        sink.append(&ActivityEntry::new(ActivityKind::CheckIn, Utc::now()))
            .unwrap();

        let entries = read_entries(&log_path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, entry.id);
        assert_eq!(entries[0].completed_sets, Some(12));
        assert_eq!(entries[1].kind, ActivityKind::CheckIn);
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let entries = read_entries(&temp_dir.path().join("none.log")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("activity.log");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&workout_entry(3)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
            writeln!(file, "{{ not json").unwrap();
            writeln!(file).unwrap();
        }
        sink.append(&workout_entry(4)).unwrap();

        let entries = read_entries(&log_path).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
