//! Experience and level accrual.
//!
//! XP carries over between levels: every full 1000 XP is converted into one
//! level. There is no level cap.

use crate::{SessionSummary, Stats};

/// XP needed to gain one level
pub const XP_PER_LEVEL: u32 = 1000;

impl Stats {
    /// Add XP, converting each full [`XP_PER_LEVEL`] into a level
    pub fn apply_xp(self, delta: u32) -> Stats {
        let mut xp = self.xp.saturating_add(delta);
        let mut level = self.level.max(1);
        while xp >= XP_PER_LEVEL {
            xp -= XP_PER_LEVEL;
            level += 1;
        }
        Stats { xp, level }
    }

    /// Take XP back within the current level; never drops below zero or
    /// loses a level
    pub fn remove_xp(self, delta: u32) -> Stats {
        Stats {
            xp: self.xp.saturating_sub(delta),
            level: self.level,
        }
    }
}

/// Derives session rewards from completed sets
#[derive(Clone, Copy, Debug)]
pub struct RewardCalculator {
    pub xp_per_set: u32,
}

impl RewardCalculator {
    pub fn new(xp_per_set: u32) -> Self {
        Self { xp_per_set }
    }

    /// Compute the summary for a finished session against the prior stats
    pub fn finalize(&self, completed_set_count: u32, prior: Stats) -> SessionSummary {
        let xp_awarded = completed_set_count.saturating_mul(self.xp_per_set);
        let updated = prior.apply_xp(xp_awarded);

        if updated.level > prior.level {
            tracing::info!(
                "Level up: {} -> {} ({} XP awarded)",
                prior.level,
                updated.level,
                xp_awarded
            );
        }

        SessionSummary {
            completed_set_count,
            xp_awarded,
            new_xp: updated.xp,
            new_level: updated.level,
        }
    }
}
