#![forbid(unsafe_code)]

//! Core domain model and business logic for LevelUp, a gamified workout
//! and habit tracker.
//!
//! This crate provides:
//! - Domain types (exercises, plans, session state, stats)
//! - The workout session engine and its clock/store seams
//! - XP and level accrual
//! - Persistence (profile state, activity log, CSV archive)
//! - Wake-up streaks, the focus timer and daily tasks
//! - The manual exercise checklist and the daily timetable

pub mod types;
pub mod error;
pub mod plan;
pub mod config;
pub mod logging;
pub mod clock;
pub mod reward;
pub mod state;
pub mod store;
pub mod engine;
pub mod activity;
pub mod history;
pub mod rollup;
pub mod streak;
pub mod focus;
pub mod tasks;
pub mod checklist;
pub mod timetable;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use plan::default_plan;
pub use config::{Config, SessionConfig, TimetableSlot};
pub use clock::{Clock, InstantClock, SystemClock};
pub use reward::{RewardCalculator, XP_PER_LEVEL};
pub use store::{JsonFileStore, MemoryStore, ProgressStore};
pub use engine::{Completion, ExitReport, SessionEngine};
pub use activity::{ActivitySink, JsonlSink};
pub use history::load_recent_entries;
pub use streak::{record_check_in, CheckInOutcome};
pub use focus::FocusTimer;
pub use tasks::{TaskList, TaskToggle};
pub use checklist::{Checklist, ChecklistToggle};
pub use timetable::active_slot;
