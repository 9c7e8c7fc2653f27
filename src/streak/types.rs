//! Data types for daily activity streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Timezone applied when a user has no explicit zone configured, or when a
/// stored zone string no longer parses.
pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

/// A user's daily activity streak.
///
/// `count` grows without bound — only the bonus lookup is capped, so a
/// streak past the bonus table keeps accruing days while the payout
/// plateaus. `last_activity_day` is a calendar day in the user's own
/// timezone and is written at most once per distinct local day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreak {
    /// Consecutive local days with at least one rewarding action.
    pub count: u32,

    /// Local calendar day of the most recent rewarding action.
    pub last_activity_day: Option<NaiveDate>,

    /// IANA timezone identifier the streak day is computed in.
    pub timezone: String,
}

impl DailyStreak {
    /// Fresh streak state in the given timezone.
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            count: 0,
            last_activity_day: None,
            timezone: timezone.into(),
        }
    }
}

impl Default for DailyStreak {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

/// How one observation moved the streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakChange {
    /// First rewarding action of a day directly following the previous one.
    Extended,

    /// First rewarding action ever, or after a gap of two or more days.
    Restarted,

    /// Another rewarding action on an already-counted day.
    Unchanged,
}

/// Result of observing one rewarding action against the streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakOutcome {
    /// What happened to the streak.
    pub change: StreakChange,

    /// Streak count after the observation.
    pub count: u32,

    /// Bonus XP this observation yields (0 when [`StreakChange::Unchanged`]).
    pub bonus_xp: u32,
}
