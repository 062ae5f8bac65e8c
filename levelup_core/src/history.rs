//! Activity history loading with a rolling day window.
//!
//! Recent entries come from both the live activity log and the CSV
//! archive, so the weekly view survives a rollup.

use crate::rollup::CsvRow;
use crate::{ActivityEntry, ActivityKind, Result};
use chrono::{Duration, Local, NaiveDate, Utc};
use csv::ReaderBuilder;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Load entries from the last N days from both the log and the CSV archive
///
/// Returns entries sorted by recorded_at (newest first). Entries present in
/// both sources are returned once.
pub fn load_recent_entries(
    log_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<ActivityEntry>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    for entry in crate::activity::read_entries(log_path)? {
        if entry.recorded_at >= cutoff && seen_ids.insert(entry.id) {
            entries.push(entry);
        }
    }
    tracing::debug!("Loaded {} entries from activity log", entries.len());

    if csv_path.exists() {
        let mut csv_count = 0;
        for entry in load_entries_from_csv(csv_path)? {
            if entry.recorded_at >= cutoff && seen_ids.insert(entry.id) {
                entries.push(entry);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} entries from CSV", csv_count);
    }

    entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    tracing::info!(
        "Loaded {} total entries from last {} days",
        entries.len(),
        days
    );

    Ok(entries)
}

fn load_entries_from_csv(path: &Path) -> Result<Vec<ActivityEntry>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match ActivityEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(entries)
}

/// Local calendar dates on which anything was logged
pub fn active_days(entries: &[ActivityEntry]) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .map(|e| e.recorded_at.with_timezone(&Local).date_naive())
        .collect()
}

/// Most recent entry of the given kind (entries sorted newest first)
pub fn last_of_kind(entries: &[ActivityEntry], kind: ActivityKind) -> Option<&ActivityEntry> {
    entries.iter().find(|e| e.kind == kind)
}
