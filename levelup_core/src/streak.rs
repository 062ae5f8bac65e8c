//! Wake-up check-in streak.
//!
//! A check-in only counts inside the configured morning window. The streak
//! grows by one when the previous check-in was yesterday and restarts at 1
//! after any gap. All dates are local calendar dates.

use crate::config::CheckInConfig;
use crate::StreakState;
use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Result of a check-in attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckInOutcome {
    Recorded { streak: u32 },
    AlreadyCheckedIn { streak: u32 },
    OutsideWindow,
}

impl CheckInConfig {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let hour = at.hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Record a check-in at local time `now`
pub fn record_check_in(
    state: &mut StreakState,
    now: NaiveDateTime,
    window: &CheckInConfig,
) -> CheckInOutcome {
    if !window.contains(now) {
        tracing::debug!("Check-in at {} is outside the window", now);
        return CheckInOutcome::OutsideWindow;
    }

    let today = now.date();
    if state.last_check_in == Some(today) {
        return CheckInOutcome::AlreadyCheckedIn {
            streak: state.count,
        };
    }

    state.count = if state.last_check_in == today.pred_opt() {
        state.count.saturating_add(1)
    } else {
        1
    };
    state.last_check_in = Some(today);

    tracing::info!("Checked in on {} (streak {})", today, state.count);
    CheckInOutcome::Recorded {
        streak: state.count,
    }
}

/// Streak as of `today`: zero once a full day has been missed
pub fn current_streak(state: &StreakState, today: NaiveDate) -> u32 {
    match state.last_check_in {
        Some(last) if last == today || Some(last) == today.pred_opt() => state.count,
        _ => 0,
    }
}
