//! Core domain types for the LevelUp system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and the workout plan they form
//! - Session phases, the live session snapshot and its summary
//! - Experience/level stats and the wake-up streak
//! - Daily tasks and activity log entries

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// How the work phase of an exercise ends
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Clock-driven work phase of a fixed length
    Timed { duration_seconds: u32 },
    /// Work phase ends when the user confirms the set (reps are informational)
    Reps { reps_per_set: u32 },
}

/// A single entry in the workout plan (e.g., "Jumping Jacks, 3 x 60s")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Zero means the set count was missing; rejected by plan validation.
    #[serde(default)]
    pub set_count: u32,
    pub kind: ExerciseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

impl Exercise {
    /// Work duration for timed exercises, `None` for reps-based ones
    pub fn duration_seconds(&self) -> Option<u32> {
        match self.kind {
            ExerciseKind::Timed { duration_seconds } => Some(duration_seconds),
            ExerciseKind::Reps { .. } => None,
        }
    }

    /// Attach how-to text shown on the exercise detail view
    pub fn with_guide(mut self, description: &str, steps: &[&str], tips: &str) -> Self {
        self.description = Some(description.into());
        self.steps = steps.iter().map(|s| s.to_string()).collect();
        self.tips = Some(tips.into());
        self
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.kind, ExerciseKind::Timed { .. })
    }

    /// Human readable target for one set ("60s" or "20 reps")
    pub fn target_label(&self) -> String {
        match self.kind {
            ExerciseKind::Timed { duration_seconds } => format!("{}s", duration_seconds),
            ExerciseKind::Reps { reps_per_set } => format!("{} reps", reps_per_set),
        }
    }
}

/// Ordered, immutable list of exercises. Insertion order is execution order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WorkoutPlan {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

// ============================================================================
// Session Types
// ============================================================================

/// The session's current activity mode
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    Rest,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Work => "work",
            Phase::Rest => "rest",
            Phase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Which rest is running; decides what the following work phase is
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestKind {
    /// Between two sets of the same exercise
    InterSet,
    /// Before the next exercise in the plan
    InterExercise,
    /// Shortened rest after a skipped set
    Skip,
}

/// Read-only snapshot of a running session, handed to the presentation layer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    /// Index into the plan; equals the plan length once `phase` is `Done`
    pub exercise_index: usize,
    /// 1-based set number within the current exercise
    pub current_set: u32,
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub is_running: bool,
    /// Sets marked complete this session (skipped sets excluded)
    pub completed_set_count: u32,
}

impl SessionState {
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}

/// Rewards derived once a session reaches `Done`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub completed_set_count: u32,
    pub xp_awarded: u32,
    pub new_xp: u32,
    pub new_level: u32,
}

// ============================================================================
// Progress and Profile Types
// ============================================================================

/// Experience points and level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub xp: u32,
    pub level: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self { xp: 0, level: 1 }
    }
}

/// Wake-up check-in streak
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StreakState {
    pub count: u32,
    pub last_check_in: Option<NaiveDate>,
}

/// A to-do item on the home list
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyTask {
    pub id: Uuid,
    pub title: String,
    pub goal: String,
    pub completed: bool,
}

/// User's persistent state across sessions
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProfileState {
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub streak: StreakState,
    #[serde(default)]
    pub completed_exercise_ids: BTreeSet<String>,
    #[serde(default)]
    pub tasks: Vec<DailyTask>,
}

// ============================================================================
// Activity Log Types
// ============================================================================

/// What kind of activity produced a log entry
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Workout,
    CheckIn,
    Focus,
    Task,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Workout => "workout",
            ActivityKind::CheckIn => "check_in",
            ActivityKind::Focus => "focus",
            ActivityKind::Task => "task",
        }
    }
}

/// One line of the daily activity log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub xp_awarded: u32,
    #[serde(default)]
    pub completed_sets: Option<u32>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ActivityEntry {
    /// New entry stamped with a fresh id
    pub fn new(kind: ActivityKind, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            recorded_at,
            xp_awarded: 0,
            completed_sets: None,
            detail: None,
        }
    }
}
