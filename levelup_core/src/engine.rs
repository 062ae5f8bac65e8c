//! Workout session engine.
//!
//! Sequences a plan of multi-set exercises through alternating work and
//! rest phases. Two inputs drive it: clock ticks (while a timed phase is
//! running) and user actions. Every phase end goes through one transition
//! table:
//!
//! 1. More sets left: count the set, bump `current_set`, inter-set rest.
//! 2. Last set, more exercises left: count the set, inter-exercise rest.
//! 3. Last set of the last exercise: count the set, `Done`, finalize.
//! 4. Rest expires: start the next work phase (advancing the exercise
//!    after an inter-exercise rest). Timed work starts running, reps work
//!    waits for a manual "set complete".
//!
//! Skipped sets follow the same table without being counted, and always use
//! the short skip rest.

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::reward::RewardCalculator;
use crate::store::ProgressStore;
use crate::{
    Error, Exercise, Phase, RestKind, Result, SessionState, SessionSummary, Stats, WorkoutPlan,
};
use std::collections::BTreeSet;

/// Result of a session reaching `Done`
///
/// The summary is always present; `persistence_error` is set when saving
/// the rewards failed, so the caller can retry or warn the user.
#[derive(Debug)]
pub struct Completion {
    pub summary: SessionSummary,
    pub persistence_error: Option<Error>,
}

impl Completion {
    pub fn is_persisted(&self) -> bool {
        self.persistence_error.is_none()
    }
}

/// What the caller gets back from [`SessionEngine::exit`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitReport {
    pub state: SessionState,
    pub reached_done: bool,
}

#[derive(Clone, Copy, Debug)]
struct ActiveRest {
    kind: RestKind,
    advances_exercise: bool,
}

/// Timer-driven state machine for one workout session
pub struct SessionEngine<C: Clock, S: ProgressStore> {
    plan: WorkoutPlan,
    settings: SessionConfig,
    rewards: RewardCalculator,
    prior_stats: Stats,
    state: SessionState,
    rest: Option<ActiveRest>,
    /// Exercises with at least one counted set
    completed_ids: BTreeSet<String>,
    clock: C,
    store: S,
}

impl<C: Clock, S: ProgressStore> SessionEngine<C, S> {
    /// Start a session at the first set of the first exercise
    ///
    /// Fails with [`Error::Configuration`] for an invalid plan and with
    /// [`Error::Persistence`] when prior stats cannot be read. A timed first
    /// exercise starts paused; the caller starts it with [`toggle_run`].
    ///
    /// [`toggle_run`]: SessionEngine::toggle_run
    pub fn start(plan: WorkoutPlan, settings: SessionConfig, clock: C, mut store: S) -> Result<Self> {
        let errors = plan.validate();
        if !errors.is_empty() {
            tracing::warn!("Refusing to start session: {}", errors.join("; "));
            return Err(Error::Configuration(errors.join("; ")));
        }

        let prior_stats = store.load_stats().map_err(Error::into_persistence)?;

        let mut engine = Self {
            rewards: RewardCalculator::new(settings.xp_per_set),
            plan,
            settings,
            prior_stats,
            state: SessionState {
                exercise_index: 0,
                current_set: 1,
                phase: Phase::Work,
                remaining_seconds: 0,
                is_running: false,
                completed_set_count: 0,
            },
            rest: None,
            completed_ids: BTreeSet::new(),
            clock,
            store,
        };
        engine.enter_work();
        engine.state.is_running = false;
        engine.sync_clock();

        tracing::info!(
            "Session started: {} exercises, {} sets, prior level {} ({} XP)",
            engine.plan.len(),
            engine.plan.total_sets(),
            prior_stats.level,
            prior_stats.xp
        );
        Ok(engine)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the current state for rendering
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    /// Exercise being worked on (or rested after); `None` once done
    pub fn current_exercise(&self) -> Option<&Exercise> {
        if self.state.is_done() {
            return None;
        }
        self.plan.exercise_at(self.state.exercise_index)
    }

    /// Exercise that follows the running rest, if any
    pub fn upcoming_exercise(&self) -> Option<&Exercise> {
        let rest = self.rest?;
        let offset = usize::from(rest.advances_exercise);
        self.plan.exercise_at(self.state.exercise_index + offset)
    }

    pub fn rest_kind(&self) -> Option<RestKind> {
        self.rest.map(|r| r.kind)
    }

    pub fn prior_stats(&self) -> Stats {
        self.prior_stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True when the current work phase ends only by user confirmation
    pub fn awaiting_manual_completion(&self) -> bool {
        self.state.phase == Phase::Work
            && self.current_exercise().is_some_and(|e| !e.is_timed())
    }

    // ── Clock input ──────────────────────────────────────────────────

    /// Advance the running phase by one second
    ///
    /// Ignored while paused. When the countdown reaches zero the phase-end
    /// transition is applied before returning.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.state.is_running {
            tracing::debug!("Tick ignored: session not running");
            return None;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);

        let completion = if self.state.remaining_seconds == 0 {
            match self.state.phase {
                Phase::Work => self.finish_set(true),
                Phase::Rest => {
                    self.finish_rest();
                    None
                }
                Phase::Done => None,
            }
        } else {
            None
        };

        self.sync_clock();
        completion
    }

    /// Pump ticks from the clock while the session runs
    ///
    /// Returns once the session pauses, waits for a manual set, or
    /// completes. `observer` sees the state after every tick.
    pub fn run_until_idle<F>(&mut self, mut observer: F) -> Option<Completion>
    where
        F: FnMut(&SessionState),
    {
        while self.state.is_running {
            if !self.clock.wait_tick() {
                break;
            }
            let completion = self.tick();
            observer(&self.state);
            if completion.is_some() {
                return completion;
            }
        }
        None
    }

    /// Wait for one clock tick and apply it. Does nothing while paused, so a
    /// caller can interleave user input between single ticks.
    pub fn tick_from_clock(&mut self) -> Option<Completion> {
        if !self.state.is_running || !self.clock.wait_tick() {
            return None;
        }
        self.tick()
    }

    // ── User actions ─────────────────────────────────────────────────

    /// Start or pause the countdown of a timed phase
    pub fn toggle_run(&mut self) -> Result<()> {
        let timed_phase = match self.state.phase {
            Phase::Rest => true,
            Phase::Work => self.current_exercise().is_some_and(|e| e.is_timed()),
            Phase::Done => false,
        };
        if !timed_phase {
            return Err(self.reject("toggle_run"));
        }

        self.state.is_running = !self.state.is_running;
        tracing::debug!(
            "{} {} phase with {}s left",
            if self.state.is_running { "Resumed" } else { "Paused" },
            self.state.phase,
            self.state.remaining_seconds
        );
        self.sync_clock();
        Ok(())
    }

    /// Mark the current reps-based set as done
    pub fn complete_set_manually(&mut self) -> Result<Option<Completion>> {
        if !self.awaiting_manual_completion() {
            return Err(self.reject("complete_set"));
        }
        let completion = self.finish_set(true);
        self.sync_clock();
        Ok(completion)
    }

    /// Give up on the current set without earning it
    pub fn skip(&mut self) -> Result<Option<Completion>> {
        if self.state.phase != Phase::Work {
            return Err(self.reject("skip"));
        }
        tracing::debug!(
            "Skipping set {} of exercise #{}",
            self.state.current_set,
            self.state.exercise_index + 1
        );
        let completion = self.finish_set(false);
        self.sync_clock();
        Ok(completion)
    }

    /// End the session now
    ///
    /// No rewards are computed and nothing is persisted unless the session
    /// had already completed. Any pending timer is cancelled.
    pub fn exit(mut self) -> ExitReport {
        self.state.is_running = false;
        self.clock.cancel();

        let reached_done = self.state.is_done();
        if !reached_done {
            tracing::info!(
                "Session exited early at exercise #{} set {} ({} sets completed)",
                self.state.exercise_index + 1,
                self.state.current_set,
                self.state.completed_set_count
            );
        }

        ExitReport {
            state: self.state,
            reached_done,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn reject(&self, action: &'static str) -> Error {
        tracing::warn!("Rejected '{}' during {} phase", action, self.state.phase);
        Error::InvalidAction {
            action,
            phase: self.state.phase,
        }
    }

    /// Work phase ended (timer, manual completion, or skip)
    fn finish_set(&mut self, counted: bool) -> Option<Completion> {
        let Some(exercise) = self.plan.exercise_at(self.state.exercise_index) else {
            return None;
        };
        let set_count = exercise.set_count;

        if counted {
            self.state.completed_set_count += 1;
            self.completed_ids.insert(exercise.id.clone());
        }

        let more_exercises = self.state.exercise_index + 1 < self.plan.len();

        if self.state.current_set < set_count {
            self.state.current_set += 1;
            let kind = if counted { RestKind::InterSet } else { RestKind::Skip };
            self.enter_rest(kind, false);
            None
        } else if more_exercises {
            let kind = if counted {
                RestKind::InterExercise
            } else {
                RestKind::Skip
            };
            self.enter_rest(kind, true);
            None
        } else {
            Some(self.finish_session())
        }
    }

    fn enter_rest(&mut self, kind: RestKind, advances_exercise: bool) {
        let seconds = match kind {
            RestKind::InterSet => self.settings.inter_set_rest_seconds,
            RestKind::InterExercise => self.settings.inter_exercise_rest_seconds,
            RestKind::Skip => self.settings.skip_rest_seconds,
        };

        self.rest = Some(ActiveRest {
            kind,
            advances_exercise,
        });
        self.state.phase = Phase::Rest;
        self.state.remaining_seconds = seconds;
        self.state.is_running = true;
        tracing::debug!("Rest ({:?}) for {}s", kind, seconds);

        if seconds == 0 {
            self.finish_rest();
        }
    }

    fn finish_rest(&mut self) {
        if let Some(rest) = self.rest.take() {
            if rest.advances_exercise {
                self.state.exercise_index += 1;
                self.state.current_set = 1;
            }
        }
        self.enter_work();
    }

    fn enter_work(&mut self) {
        let duration = self
            .plan
            .exercise_at(self.state.exercise_index)
            .and_then(Exercise::duration_seconds);

        self.state.phase = Phase::Work;
        match duration {
            Some(seconds) => {
                self.state.remaining_seconds = seconds;
                self.state.is_running = true;
            }
            None => {
                self.state.remaining_seconds = 0;
                self.state.is_running = false;
            }
        }
        tracing::debug!(
            "Work: exercise #{} set {}",
            self.state.exercise_index + 1,
            self.state.current_set
        );
    }

    /// Enter `Done`, compute rewards and write them to the store
    fn finish_session(&mut self) -> Completion {
        self.state.phase = Phase::Done;
        self.state.exercise_index = self.plan.len();
        self.state.remaining_seconds = 0;
        self.state.is_running = false;
        self.rest = None;
        self.clock.cancel();

        let summary = self
            .rewards
            .finalize(self.state.completed_set_count, self.prior_stats);
        tracing::info!(
            "Session complete: {} sets, +{} XP, level {}",
            summary.completed_set_count,
            summary.xp_awarded,
            summary.new_level
        );

        let mut persistence_error = None;

        let stats = Stats {
            xp: summary.new_xp,
            level: summary.new_level,
        };
        if let Err(e) = self.store.save_stats(&stats) {
            tracing::warn!("Failed to save stats: {}", e);
            persistence_error = Some(e.into_persistence());
        }

        match self.store.load_completed_exercise_ids() {
            Ok(mut ids) => {
                ids.extend(self.completed_ids.iter().cloned());
                if let Err(e) = self.store.save_completed_exercise_ids(&ids) {
                    tracing::warn!("Failed to save completed exercises: {}", e);
                    persistence_error.get_or_insert(e.into_persistence());
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load completed exercises: {}", e);
                persistence_error.get_or_insert(e.into_persistence());
            }
        }

        Completion {
            summary,
            persistence_error,
        }
    }

    /// Keep the clock subscription in lockstep with `is_running`
    fn sync_clock(&mut self) {
        if self.state.is_running {
            self.clock.subscribe();
        } else {
            self.clock.cancel();
        }
    }
}
