//! Progress store: the persistence gateway used by workout sessions.
//!
//! Sessions only touch the store at start (reading stats) and at
//! completion (writing stats and the completed-exercise set).

use crate::{Error, ProfileState, Result, Stats};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Durable storage for stats and completed exercises
pub trait ProgressStore {
    fn load_stats(&mut self) -> Result<Stats>;
    fn save_stats(&mut self, stats: &Stats) -> Result<()>;
    fn load_completed_exercise_ids(&mut self) -> Result<BTreeSet<String>>;
    fn save_completed_exercise_ids(&mut self, ids: &BTreeSet<String>) -> Result<()>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for &mut S {
    fn load_stats(&mut self) -> Result<Stats> {
        (**self).load_stats()
    }

    fn save_stats(&mut self, stats: &Stats) -> Result<()> {
        (**self).save_stats(stats)
    }

    fn load_completed_exercise_ids(&mut self) -> Result<BTreeSet<String>> {
        (**self).load_completed_exercise_ids()
    }

    fn save_completed_exercise_ids(&mut self, ids: &BTreeSet<String>) -> Result<()> {
        (**self).save_completed_exercise_ids(ids)
    }
}

/// Store backed by the profile JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn load_stats(&mut self) -> Result<Stats> {
        Ok(ProfileState::load(&self.path)?.stats)
    }

    fn save_stats(&mut self, stats: &Stats) -> Result<()> {
        ProfileState::update(&self.path, |state| {
            state.stats = *stats;
            Ok(())
        })
    }

    fn load_completed_exercise_ids(&mut self) -> Result<BTreeSet<String>> {
        Ok(ProfileState::load(&self.path)?.completed_exercise_ids)
    }

    fn save_completed_exercise_ids(&mut self, ids: &BTreeSet<String>) -> Result<()> {
        ProfileState::update(&self.path, |state| {
            state.completed_exercise_ids = ids.clone();
            Ok(())
        })
    }
}

/// In-process store; counts writes and can be told to fail them
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub stats: Stats,
    pub completed_exercise_ids: BTreeSet<String>,
    pub stats_writes: usize,
    pub id_writes: usize,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn with_stats(stats: Stats) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }

    pub fn total_writes(&self) -> usize {
        self.stats_writes + self.id_writes
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Persistence("memory store is read-only".into()));
        }
        Ok(())
    }
}

impl ProgressStore for MemoryStore {
    fn load_stats(&mut self) -> Result<Stats> {
        Ok(self.stats)
    }

    fn save_stats(&mut self, stats: &Stats) -> Result<()> {
        self.check_writable()?;
        self.stats = *stats;
        self.stats_writes += 1;
        Ok(())
    }

    fn load_completed_exercise_ids(&mut self) -> Result<BTreeSet<String>> {
        Ok(self.completed_exercise_ids.clone())
    }

    fn save_completed_exercise_ids(&mut self, ids: &BTreeSet<String>) -> Result<()> {
        self.check_writable()?;
        self.completed_exercise_ids = ids.clone();
        self.id_writes += 1;
        Ok(())
    }
}
