//! Data types for level progression.

use serde::{Deserialize, Serialize};

use crate::config::LevelCurve;

/// A user's level progression state.
///
/// The four stored fields move together: `experience_total` only ever grows,
/// `experience_current_level` and `experience_next_level` bracket the
/// current level's XP band, and `progress_percent` is derived from the other
/// three after every mutation — it is never updated independently.
///
/// # Invariants
///
/// - `experience_next_level > experience_current_level`
/// - `experience_total` is monotonically non-decreasing
/// - `1 <= current_level <= LevelCurve::max_level`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    /// Current level, starting at 1.
    pub current_level: u32,

    /// Lifetime XP earned across all sources.
    pub experience_total: u64,

    /// XP threshold at which the current level began.
    pub experience_current_level: u64,

    /// XP threshold at which the next level begins.
    pub experience_next_level: u64,

    /// Progress through the current level band, 0..=100.
    pub progress_percent: u8,
}

impl LevelState {
    /// Initial state for a freshly materialized user: level 1, no XP.
    pub fn initial(curve: &LevelCurve) -> Self {
        Self {
            current_level: 1,
            experience_total: 0,
            experience_current_level: 0,
            experience_next_level: curve.base_threshold,
            progress_percent: 0,
        }
    }

    /// XP still needed to reach the next level.
    ///
    /// Returns 0 at the level cap once the total passes the threshold.
    pub fn remaining_to_next(&self) -> u64 {
        self.experience_next_level
            .saturating_sub(self.experience_total)
    }
}
