//! Manual exercise checklist.
//!
//! Outside a guided session the user can tick exercises off the plan one at a
//! time. Ticking awards a fixed amount of XP; unticking takes it back without
//! ever costing a level.

use crate::types::WorkoutPlan;
use crate::{Error, Result, Stats};
use std::collections::BTreeSet;

/// Outcome of toggling an exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChecklistToggle {
    pub completed: bool,
    /// Signed XP change applied to the stats
    pub xp_delta: i64,
}

/// Completion set of the persisted profile, viewed against a plan
pub struct Checklist<'a> {
    plan: &'a WorkoutPlan,
    completed: &'a mut BTreeSet<String>,
    xp_per_check: u32,
}

impl<'a> Checklist<'a> {
    pub fn new(
        plan: &'a WorkoutPlan,
        completed: &'a mut BTreeSet<String>,
        xp_per_check: u32,
    ) -> Self {
        Self {
            plan,
            completed,
            xp_per_check,
        }
    }

    pub fn is_done(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Number of plan exercises marked done
    pub fn done_count(&self) -> usize {
        self.plan
            .iter()
            .filter(|e| self.completed.contains(&e.id))
            .count()
    }

    /// Share of the plan marked done, rounded down to a whole percent
    pub fn progress_percent(&self) -> u32 {
        if self.plan.is_empty() {
            return 0;
        }
        (self.done_count() * 100 / self.plan.len()) as u32
    }

    /// Flip an exercise between done and not done
    pub fn toggle(&mut self, id: &str, stats: &mut Stats) -> Result<ChecklistToggle> {
        let plan = self.plan;
        let exercise = plan
            .find(id)
            .ok_or_else(|| Error::Other(format!("No exercise with id '{}' in the plan", id)))?;

        if self.completed.remove(id) {
            *stats = stats.remove_xp(self.xp_per_check);
            tracing::info!("Unchecked '{}' (-{} XP)", exercise.name, self.xp_per_check);
            Ok(ChecklistToggle {
                completed: false,
                xp_delta: -i64::from(self.xp_per_check),
            })
        } else {
            self.completed.insert(exercise.id.clone());
            *stats = stats.apply_xp(self.xp_per_check);
            tracing::info!("Checked '{}' (+{} XP)", exercise.name, self.xp_per_check);
            Ok(ChecklistToggle {
                completed: true,
                xp_delta: i64::from(self.xp_per_check),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_plan;

    #[test]
    fn test_check_and_uncheck() {
        let mut completed = BTreeSet::new();
        let mut stats = Stats { xp: 995, level: 1 };
        let mut list = Checklist::new(default_plan(), &mut completed, 10);

        let done = list.toggle("plank", &mut stats).unwrap();
        assert_eq!(done, ChecklistToggle { completed: true, xp_delta: 10 });
        assert_eq!(stats, Stats { xp: 5, level: 2 });
        assert!(list.is_done("plank"));

        // Undo after a level up keeps the level and floors XP at zero
        let undone = list.toggle("plank", &mut stats).unwrap();
        assert_eq!(undone, ChecklistToggle { completed: false, xp_delta: -10 });
        assert_eq!(stats, Stats { xp: 0, level: 2 });
        assert!(!list.is_done("plank"));
    }

    #[test]
    fn test_progress_percent() {
        let mut completed = BTreeSet::new();
        // Ids outside the plan are ignored
        completed.insert("retired".to_string());
        let mut stats = Stats::default();
        let mut list = Checklist::new(default_plan(), &mut completed, 10);
        assert_eq!(list.progress_percent(), 0);

        for id in ["plank", "burpees", "squats"] {
            list.toggle(id, &mut stats).unwrap();
        }
        // 3 of 16
        assert_eq!(list.done_count(), 3);
        assert_eq!(list.progress_percent(), 18);
    }

    #[test]
    fn test_unknown_exercise_rejected() {
        let mut completed = BTreeSet::new();
        let mut stats = Stats::default();
        let mut list = Checklist::new(default_plan(), &mut completed, 10);

        assert!(list.toggle("yoga", &mut stats).is_err());
        assert_eq!(stats, Stats::default());
        assert!(completed.is_empty());
    }
}
