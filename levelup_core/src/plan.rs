//! Default daily workout plan and plan validation.
//!
//! This module provides the built-in plan and lets callers load their own
//! from a TOML file with `[[exercises]]` tables.

use crate::types::*;
use crate::Result;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Cached default plan - built once and reused across sessions
static DEFAULT_PLAN: Lazy<WorkoutPlan> = Lazy::new(build_default_plan);

/// Get a reference to the cached default plan
pub fn default_plan() -> &'static WorkoutPlan {
    &DEFAULT_PLAN
}

fn reps(id: &str, name: &str, set_count: u32, reps_per_set: u32) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        set_count,
        kind: ExerciseKind::Reps { reps_per_set },
        description: None,
        steps: Vec::new(),
        tips: None,
    }
}

fn timed(id: &str, name: &str, set_count: u32, duration_seconds: u32) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        set_count,
        kind: ExerciseKind::Timed { duration_seconds },
        description: None,
        steps: Vec::new(),
        tips: None,
    }
}

/// Builds the built-in daily plan
///
/// Eight three-set strength/cardio blocks followed by a single-set core and
/// legs finisher.
pub fn build_default_plan() -> WorkoutPlan {
    WorkoutPlan::new(vec![
        // ====================================================================
        // Main block (3 sets each)
        // ====================================================================
        reps("push_dynamic", "Dynamic Pushups", 3, 20).with_guide(
            "Builds explosive chest, shoulder and tricep strength by recruiting fast-twitch fibers.",
            &[
                "Start in a standard pushup position.",
                "Lower until your chest nearly touches the floor.",
                "Push up explosively with control.",
                "Return to the start and repeat.",
            ],
            "Keep your core tight and elbows slightly tucked.",
        ),
        reps("inout_push", "In & Out Pushups", 3, 10).with_guide(
            "Works the inner and outer chest by switching hand width each rep.",
            &[
                "Start with hands in a narrow stance.",
                "Lower and push back up.",
                "Step your hands out wide.",
                "Do another pushup and step back in.",
            ],
            "Move your hands smoothly and keep wrists neutral.",
        ),
        timed("jumping_jacks", "Jumping Jacks", 3, 60).with_guide(
            "Full-body cardio that raises endurance and warms up every major muscle group.",
            &[
                "Stand tall with arms at your sides.",
                "Jump your feet apart while raising your arms.",
                "Jump back to the start.",
            ],
            "Land softly on the balls of your feet.",
        ),
        timed("mountain", "Mountain Climbers", 3, 60).with_guide(
            "Core-heavy cardio that burns calories and builds agility.",
            &[
                "Begin in a high plank.",
                "Drive one knee toward your chest.",
                "Switch legs at a fast, controlled pace.",
            ],
            "Keep your back flat and hips level.",
        ),
        reps("diamond", "Diamond Pushups", 3, 10).with_guide(
            "Isolates the triceps and hits the inner chest.",
            &[
                "Make a diamond with your hands under your chest.",
                "Lower with elbows close to your body.",
                "Press up while squeezing the triceps.",
            ],
            "Drop to your knees if needed and progress later.",
        ),
        timed("lunges", "Lunges", 3, 60).with_guide(
            "Strengthens quads and glutes while training balance.",
            &[
                "Step forward with one leg.",
                "Lower until both knees are at 90 degrees.",
                "Push back up and switch legs.",
            ],
            "Keep your front knee behind your toes.",
        ),
        timed("plank", "Plank", 3, 60).with_guide(
            "Static hold for the abs, obliques and lower back.",
            &[
                "Get into a forearm plank.",
                "Hold your body in a straight line.",
                "Breathe steadily until time is up.",
            ],
            "Do not let your hips sag or pike up.",
        ),
        timed("burpees", "Burpees", 3, 60).with_guide(
            "Explosive full-body move for stamina and strength.",
            &[
                "Squat and place your hands on the floor.",
                "Kick your feet back into a plank.",
                "Do a pushup.",
                "Jump your feet in and explode upward.",
            ],
            "Land softly and keep form ahead of speed.",
        ),
        // ====================================================================
        // Finisher (1 set each)
        // ====================================================================
        reps("crunches", "Crunches", 1, 20).with_guide(
            "Targets the upper abs.",
            &[
                "Lie on your back with knees bent.",
                "Lift your shoulders off the floor.",
                "Squeeze at the top and lower slowly.",
            ],
            "Do not pull on your neck.",
        ),
        reps("heel", "Heel Touch", 1, 20).with_guide(
            "Works the obliques.",
            &[
                "Lie on your back with knees bent.",
                "Crunch sideways to touch your right heel.",
                "Crunch the other way to touch your left heel.",
            ],
            "Keep the movement small and controlled.",
        ),
        reps("bicycle", "Bicycle Crunches", 1, 20).with_guide(
            "Activates the whole abdominal wall.",
            &[
                "Lie down and lift your legs to 90 degrees.",
                "Bring one elbow toward the opposite knee.",
                "Alternate sides in a pedaling motion.",
            ],
            "Slow and controlled beats fast and sloppy.",
        ),
        reps("legraise", "Leg Raises", 1, 20).with_guide(
            "Strengthens the lower abs and hip flexors.",
            &[
                "Lie flat with legs straight.",
                "Raise your legs to 90 degrees without bending the knees.",
                "Lower slowly without touching the floor.",
            ],
            "Keep your lower back pressed into the floor.",
        ),
        reps("vups", "V-Ups", 1, 20).with_guide(
            "Works upper and lower abs together.",
            &[
                "Lie flat with arms overhead.",
                "Lift legs and upper body at the same time.",
                "Touch your hands to your feet at the top.",
            ],
            "Exhale on the way up, inhale on the way down.",
        ),
        reps("squats", "Squats", 1, 30).with_guide(
            "Targets quads, hamstrings and glutes.",
            &[
                "Stand with feet shoulder-width apart.",
                "Sit back as if into a chair.",
                "Keep your chest up and knees out.",
            ],
            "Keep the weight on your heels.",
        ),
        reps("frog", "Frog Jumps", 1, 20).with_guide(
            "Explosive leg work for power and speed.",
            &[
                "Squat deep with hands touching the floor.",
                "Explode upward into a jump.",
                "Land softly and repeat.",
            ],
            "Stay controlled and keep the squat deep.",
        ),
        reps("calf", "Calf Raises", 1, 50).with_guide(
            "Strengthens the calves and stabilizes the ankles.",
            &[
                "Stand with feet hip-width apart.",
                "Rise onto your toes and squeeze.",
                "Lower slowly.",
            ],
            "Pause at the top of each rep.",
        ),
    ])
}

impl WorkoutPlan {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    /// Load a plan from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let plan: WorkoutPlan = toml::from_str(&contents)?;
        tracing::info!(
            "Loaded workout plan with {} exercises from {:?}",
            plan.len(),
            path
        );
        Ok(plan)
    }

    /// Exercise with the given id
    pub fn find(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Exercise at `index`, or `None` past the end of the plan
    pub fn exercise_at(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    /// Total number of sets across the plan
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.set_count).sum()
    }

    /// Validate the plan for use in a session
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.exercises.is_empty() {
            errors.push("Workout plan has no exercises".to_string());
            return errors;
        }

        let mut seen = HashSet::new();
        for (index, exercise) in self.exercises.iter().enumerate() {
            if exercise.id.is_empty() {
                errors.push(format!("Exercise #{} has empty ID", index + 1));
            } else if !seen.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if exercise.set_count == 0 {
                errors.push(format!(
                    "Exercise '{}' is missing a set count",
                    exercise.id
                ));
            }
            if let ExerciseKind::Timed { duration_seconds: 0 } = exercise.kind {
                errors.push(format!(
                    "Timed exercise '{}' has zero duration",
                    exercise.id
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_loads() {
        let plan = default_plan();
        assert_eq!(plan.len(), 16);
        assert_eq!(plan.exercise_at(0).unwrap().id, "push_dynamic");
        assert_eq!(plan.exercise_at(15).unwrap().id, "calf");
        assert!(plan.exercise_at(16).is_none());
    }

    #[test]
    fn test_default_plan_validates() {
        let errors = default_plan().validate();
        assert!(
            errors.is_empty(),
            "Default plan has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_default_plan_mixes_timed_and_reps() {
        let plan = default_plan();
        let timed = plan.iter().filter(|e| e.is_timed()).count();
        assert_eq!(timed, 5);
        assert_eq!(plan.total_sets(), 8 * 3 + 8);
    }

    #[test]
    fn test_default_plan_carries_guides() {
        let plan = default_plan();
        assert!(plan
            .iter()
            .all(|e| e.description.is_some() && e.tips.is_some() && !e.steps.is_empty()));

        let plank = plan.find("plank").unwrap();
        assert_eq!(plank.name, "Plank");
        assert_eq!(plank.steps.len(), 3);
        assert!(plan.find("yoga").is_none());
    }

    #[test]
    fn test_empty_plan_is_invalid() {
        let errors = WorkoutPlan::default().validate();
        assert_eq!(errors, vec!["Workout plan has no exercises".to_string()]);
    }

    #[test]
    fn test_duplicate_and_malformed_entries_reported() {
        let plan = WorkoutPlan::new(vec![
            timed("a", "A", 2, 30),
            timed("a", "A again", 0, 0),
        ]);
        let errors = plan.validate();
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
        assert!(errors.iter().any(|e| e.contains("set count")));
        assert!(errors.iter().any(|e| e.contains("zero duration")));
    }

    #[test]
    fn test_load_plan_from_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.toml");
        std::fs::write(
            &path,
            r#"
[[exercises]]
id = "e1"
name = "Jacks"
set_count = 2
kind = { type = "timed", duration_seconds = 5 }

[[exercises]]
id = "e2"
name = "Squats"
kind = { type = "reps", reps_per_set = 15 }
"#,
        )
        .unwrap();

        let plan = WorkoutPlan::load_from(&path).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.exercise_at(0).unwrap().duration_seconds(), Some(5));
        // Missing set count parses as zero and fails validation
        assert_eq!(plan.exercise_at(1).unwrap().set_count, 0);
        assert_eq!(plan.validate().len(), 1);
    }
}
