//! Configuration file support for LevelUp.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/levelup/config.toml`.

use crate::timetable::hhmm;
use crate::{Error, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub check_in: CheckInConfig,

    #[serde(default)]
    pub focus: FocusConfig,

    #[serde(default)]
    pub tasks: TaskConfig,

    #[serde(default = "default_timetable")]
    pub timetable: Vec<TimetableSlot>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            session: SessionConfig::default(),
            check_in: CheckInConfig::default(),
            focus: FocusConfig::default(),
            tasks: TaskConfig::default(),
            timetable: default_timetable(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Rest durations and rewards for workout sessions
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "default_inter_set_rest")]
    pub inter_set_rest_seconds: u32,

    #[serde(default = "default_inter_exercise_rest")]
    pub inter_exercise_rest_seconds: u32,

    #[serde(default = "default_skip_rest")]
    pub skip_rest_seconds: u32,

    #[serde(default = "default_xp_per_set")]
    pub xp_per_set: u32,

    /// XP for ticking an exercise off the checklist by hand
    #[serde(default = "default_xp_per_check")]
    pub xp_per_check: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inter_set_rest_seconds: default_inter_set_rest(),
            inter_exercise_rest_seconds: default_inter_exercise_rest(),
            skip_rest_seconds: default_skip_rest(),
            xp_per_set: default_xp_per_set(),
            xp_per_check: default_xp_per_check(),
        }
    }
}

/// Local-time window in which a wake-up check-in counts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckInConfig {
    #[serde(default = "default_check_in_start")]
    pub start_hour: u32,

    /// Exclusive
    #[serde(default = "default_check_in_end")]
    pub end_hour: u32,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            start_hour: default_check_in_start(),
            end_hour: default_check_in_end(),
        }
    }
}

/// Whether a focus cycle phase is study time or a break
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusPhaseKind {
    Focus,
    Break,
}

/// One phase of the focus cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FocusPhase {
    pub name: String,
    pub minutes: u32,
    pub kind: FocusPhaseKind,
}

/// Focus timer cycle configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default = "default_focus_phases")]
    pub phases: Vec<FocusPhase>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            phases: default_focus_phases(),
        }
    }
}

/// Daily task rewards
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_xp_per_task")]
    pub xp_per_task: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            xp_per_task: default_xp_per_task(),
        }
    }
}

/// One block of the daily routine, `[start, end)` in local time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimetableSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub label: String,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("levelup")
}

fn default_inter_set_rest() -> u32 {
    30
}

fn default_inter_exercise_rest() -> u32 {
    40
}

fn default_skip_rest() -> u32 {
    8
}

fn default_xp_per_set() -> u32 {
    10
}

fn default_xp_per_check() -> u32 {
    10
}

fn default_check_in_start() -> u32 {
    5
}

fn default_check_in_end() -> u32 {
    7
}

fn default_focus_phases() -> Vec<FocusPhase> {
    let phase = |name: &str, minutes, kind| FocusPhase {
        name: name.into(),
        minutes,
        kind,
    };
    vec![
        phase("Study Session 1", 25, FocusPhaseKind::Focus),
        phase("Short Rest", 5, FocusPhaseKind::Break),
        phase("Study Session 2", 25, FocusPhaseKind::Focus),
        phase("Long Rest", 10, FocusPhaseKind::Break),
    ]
}

fn default_xp_per_task() -> u32 {
    50
}

fn default_timetable() -> Vec<TimetableSlot> {
    let slot = |start: (u32, u32), end: (u32, u32), label: &str| TimetableSlot {
        start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or(NaiveTime::MIN),
        end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or(NaiveTime::MIN),
        label: label.into(),
    };
    vec![
        slot((5, 0), (7, 0), "Workout"),
        slot((7, 0), (8, 0), "Breakfast & Shower"),
        slot((8, 0), (20, 0), "Study - Pomodoro"),
        slot((20, 0), (22, 0), "Dinner & Family"),
        slot((22, 0), (23, 0), "Plan & Read"),
        slot((23, 0), (23, 59), "Sleep"),
    ]
}

/// Longest focus phase whose length in seconds still fits a `u32`
const MAX_FOCUS_MINUTES: u32 = u32::MAX / 60;

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("levelup").join("config.toml")
    }

    /// Check cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        let s = &self.session;
        if s.skip_rest_seconds > s.inter_set_rest_seconds {
            return Err(Error::Config(format!(
                "skip_rest_seconds ({}) must not exceed inter_set_rest_seconds ({})",
                s.skip_rest_seconds, s.inter_set_rest_seconds
            )));
        }
        if s.inter_set_rest_seconds > s.inter_exercise_rest_seconds {
            return Err(Error::Config(format!(
                "inter_set_rest_seconds ({}) must not exceed inter_exercise_rest_seconds ({})",
                s.inter_set_rest_seconds, s.inter_exercise_rest_seconds
            )));
        }

        let c = &self.check_in;
        if c.start_hour >= c.end_hour || c.end_hour > 24 {
            return Err(Error::Config(format!(
                "check-in window {}:00-{}:00 is empty or out of range",
                c.start_hour, c.end_hour
            )));
        }

        let phases = &self.focus.phases;
        if phases.is_empty() {
            return Err(Error::Config("focus cycle needs at least one phase".into()));
        }
        for phase in phases {
            if phase.minutes == 0 || phase.minutes > MAX_FOCUS_MINUTES {
                return Err(Error::Config(format!(
                    "focus phase '{}' must last 1-{} minutes, got {}",
                    phase.name, MAX_FOCUS_MINUTES, phase.minutes
                )));
            }
        }

        for slot in &self.timetable {
            if slot.start >= slot.end {
                return Err(Error::Config(format!(
                    "timetable slot '{}' ends before it starts",
                    slot.label
                )));
            }
        }

        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.inter_set_rest_seconds, 30);
        assert_eq!(config.session.inter_exercise_rest_seconds, 40);
        assert_eq!(config.session.skip_rest_seconds, 8);
        assert_eq!(config.session.xp_per_set, 10);
        assert_eq!(config.focus.phases.len(), 4);
        assert_eq!(config.tasks.xp_per_task, 50);
        assert_eq!(config.session.xp_per_check, 10);
        assert_eq!(config.timetable.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.session.skip_rest_seconds = 5;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.session, config.session);
        assert_eq!(parsed.focus.phases, config.focus.phases);
        assert_eq!(parsed.timetable, config.timetable);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[session]
inter_set_rest_seconds = 20
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.inter_set_rest_seconds, 20);
        assert_eq!(config.session.inter_exercise_rest_seconds, 40); // default
        assert_eq!(config.check_in.start_hour, 5); // default
    }

    #[test]
    fn test_skip_rest_longer_than_set_rest_rejected() {
        let mut config = Config::default();
        config.session.skip_rest_seconds = 45;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_check_in_window_rejected() {
        let mut config = Config::default();
        config.check_in.end_hour = config.check_in.start_hour;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_focus_phases_validated() {
        let mut config = Config::default();
        config.focus.phases.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.focus.phases[1].minutes = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.focus.phases[0].minutes = MAX_FOCUS_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oversized_focus_phase_rejected_on_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[focus]\nphases = [{ name = \"x\", minutes = 100000000, kind = \"focus\" }]\n",
        )
        .unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("focus phase 'x'"));
    }

    #[test]
    fn test_backwards_timetable_slot_rejected() {
        let mut config = Config::default();
        config.timetable[0].end = config.timetable[0].start;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.timetable.clear();
        assert!(config.validate().is_ok());
    }
}
