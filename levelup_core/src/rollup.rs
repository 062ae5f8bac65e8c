//! CSV rollup for archiving the activity log.
//!
//! The JSONL log is appended to a CSV archive, fsynced, and only then
//! renamed aside, so a crash never loses entries (at worst they are
//! archived twice, which history loading deduplicates).

use crate::{ActivityEntry, ActivityKind, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    id: String,
    kind: ActivityKind,
    recorded_at: String,
    xp_awarded: u32,
    completed_sets: Option<u32>,
    detail: Option<String>,
}

impl From<&ActivityEntry> for CsvRow {
    fn from(entry: &ActivityEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            kind: entry.kind,
            recorded_at: entry.recorded_at.to_rfc3339(),
            xp_awarded: entry.xp_awarded,
            completed_sets: entry.completed_sets,
            detail: entry.detail.clone(),
        }
    }
}

impl TryFrom<CsvRow> for ActivityEntry {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(ActivityEntry {
            id,
            kind: row.kind,
            recorded_at,
            xp_awarded: row.xp_awarded,
            completed_sets: row.completed_sets,
            detail: row.detail,
        })
    }
}

/// Roll up log entries into CSV and archive the log
///
/// Returns the number of entries moved. The log is renamed to
/// `<name>.log.processed` rather than deleted.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let entries = crate::activity::read_entries(log_path)?;

    if entries.is_empty() {
        tracing::info!("No activity to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only on a brand new archive
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} activity entries to CSV", entries.len());

    let processed_path = log_path.with_extension("log.processed");
    std::fs::rename(log_path, &processed_path)?;
    tracing::info!("Archived activity log to {:?}", processed_path);

    Ok(entries.len())
}

/// Delete archived `.processed` logs in `dir`
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed logs", count);
    }

    Ok(count)
}
