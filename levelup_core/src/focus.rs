//! Focus (study) timer cycling through configured phases.

use crate::config::{FocusConfig, FocusPhase};
use crate::{Error, Result};

/// Countdown over a repeating cycle of focus and break phases
#[derive(Clone, Debug)]
pub struct FocusTimer {
    phases: Vec<FocusPhase>,
    phase_index: usize,
    seconds_left: u32,
    is_active: bool,
}

impl FocusTimer {
    pub fn new(config: &FocusConfig) -> Result<Self> {
        let Some(first) = config.phases.first() else {
            return Err(Error::Configuration("focus cycle has no phases".into()));
        };
        let seconds_left = phase_seconds(first);
        Ok(Self {
            phases: config.phases.clone(),
            phase_index: 0,
            seconds_left,
            is_active: false,
        })
    }

    pub fn phase(&self) -> &FocusPhase {
        &self.phases[self.phase_index]
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Start or pause the countdown
    pub fn toggle(&mut self) {
        self.is_active = !self.is_active;
    }

    /// Advance one second. Returns the phase that just finished, if any.
    ///
    /// Finishing a phase stops the timer and loads the next phase, so each
    /// phase must be started explicitly.
    pub fn tick(&mut self) -> Option<FocusPhase> {
        if !self.is_active {
            return None;
        }

        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left > 0 {
            return None;
        }

        let finished = self.phase().clone();
        tracing::info!("Focus phase '{}' finished", finished.name);
        self.is_active = false;
        self.advance();
        Some(finished)
    }

    /// Skip to the next phase without finishing the current one
    pub fn next_phase(&mut self) {
        self.is_active = false;
        self.advance();
    }

    /// Back to the first phase, stopped
    pub fn reset(&mut self) {
        self.is_active = false;
        self.phase_index = 0;
        self.seconds_left = phase_seconds(&self.phases[0]);
    }

    fn advance(&mut self) {
        self.phase_index = (self.phase_index + 1) % self.phases.len();
        self.seconds_left = phase_seconds(self.phase());
    }
}

fn phase_seconds(phase: &FocusPhase) -> u32 {
    phase.minutes.saturating_mul(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FocusPhaseKind;

    fn short_cycle() -> FocusConfig {
        FocusConfig {
            phases: vec![
                FocusPhase {
                    name: "Work".into(),
                    minutes: 1,
                    kind: FocusPhaseKind::Focus,
                },
                FocusPhase {
                    name: "Rest".into(),
                    minutes: 2,
                    kind: FocusPhaseKind::Break,
                },
            ],
        }
    }

    #[test]
    fn test_starts_paused_on_first_phase() {
        let timer = FocusTimer::new(&FocusConfig::default()).unwrap();
        assert_eq!(timer.phase_index(), 0);
        assert_eq!(timer.seconds_left(), 25 * 60);
        assert!(!timer.is_active());
        assert_eq!(timer.phase_count(), 4);
    }

    #[test]
    fn test_empty_cycle_rejected() {
        let err = FocusTimer::new(&FocusConfig { phases: vec![] }).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_paused_tick_does_nothing() {
        let mut timer = FocusTimer::new(&short_cycle()).unwrap();
        assert!(timer.tick().is_none());
        assert_eq!(timer.seconds_left(), 60);
    }

    #[test]
    fn test_phase_finishes_and_stops() {
        let mut timer = FocusTimer::new(&short_cycle()).unwrap();
        timer.toggle();

        let mut finished = None;
        for _ in 0..60 {
            finished = timer.tick();
        }

        assert_eq!(finished.unwrap().name, "Work");
        assert!(!timer.is_active());
        assert_eq!(timer.phase_index(), 1);
        assert_eq!(timer.seconds_left(), 120);
    }

    #[test]
    fn test_next_phase_wraps_and_reset() {
        let mut timer = FocusTimer::new(&short_cycle()).unwrap();
        timer.toggle();
        timer.next_phase();
        assert!(!timer.is_active());
        timer.next_phase();
        assert_eq!(timer.phase_index(), 0);

        timer.toggle();
        timer.tick();
        timer.reset();
        assert_eq!(timer.seconds_left(), 60);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_huge_phase_length_saturates() {
        let config = FocusConfig {
            phases: vec![FocusPhase {
                name: "x".into(),
                minutes: 100_000_000,
                kind: FocusPhaseKind::Focus,
            }],
        };
        let mut timer = FocusTimer::new(&config).unwrap();
        assert_eq!(timer.seconds_left(), u32::MAX);

        timer.next_phase();
        timer.reset();
        assert_eq!(timer.seconds_left(), u32::MAX);
    }
}
