//! Profile state persistence with file locking.
//!
//! The whole profile (stats, streak, completed exercises, tasks) lives in a
//! single JSON file that is read under a shared lock and replaced atomically.

use crate::{Error, ProfileState, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl ProfileState {
    /// Load profile state from a file with shared locking
    ///
    /// Returns default state if file doesn't exist.
    /// If file is corrupted, logs a warning and returns default state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file found, starting fresh");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open profile {:?}: {}. Using defaults.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock profile {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        if let Err(e) = read {
            tracing::warn!("Failed to read profile {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        match serde_json::from_str::<ProfileState>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded profile from {:?}", path);
                Ok(state)
            }
            Err(e) => {
                tracing::warn!("Failed to parse profile {:?}: {}. Using defaults.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save profile state to a file with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            Error::Other(format!("profile path {:?} has no parent directory", path))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProfileState) -> Result<T>,
    {
        let mut state = Self::load(path)?;
        let out = f(&mut state)?;
        state.save(path)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stats;
    use chrono::NaiveDate;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");

        let mut state = ProfileState::default();
        state.stats = Stats { xp: 340, level: 5 };
        state.streak.count = 3;
        state.streak.last_check_in = NaiveDate::from_ymd_opt(2026, 10, 15);
        state.completed_exercise_ids.insert("plank".into());

        state.save(&path).unwrap();
        let loaded = ProfileState::load(&path).unwrap();

        assert_eq!(loaded.stats, Stats { xp: 340, level: 5 });
        assert_eq!(loaded.streak, state.streak);
        assert!(loaded.completed_exercise_ids.contains("plank"));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state = ProfileState::load(&temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(state.stats, Stats { xp: 0, level: 1 });
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_corrupted_profile_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let state = ProfileState::load(&path).unwrap();
        assert_eq!(state.stats.level, 1);
        assert!(state.completed_exercise_ids.is_empty());
    }

    #[test]
    fn test_older_profile_without_tasks_still_loads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, r#"{"stats":{"xp":12,"level":2}}"#).unwrap();

        let state = ProfileState::load(&path).unwrap();
        assert_eq!(state.stats, Stats { xp: 12, level: 2 });
        assert_eq!(state.streak.count, 0);
    }

    #[test]
    fn test_update_returns_closure_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");

        let level = ProfileState::update(&path, |state| {
            state.stats = state.stats.apply_xp(1500);
            Ok(state.stats.level)
        })
        .unwrap();
        assert_eq!(level, 2);

        let loaded = ProfileState::load(&path).unwrap();
        assert_eq!(loaded.stats, Stats { xp: 500, level: 2 });
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");

        ProfileState::default().save(&path).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
    }
}
