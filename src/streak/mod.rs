//! Daily streak tracking.
//!
//! A streak counts consecutive local calendar days with at least one
//! rewarding action, where "local" is the user's own IANA timezone — a
//! learner in Buenos Aires who finishes a lesson at 23:50 and another at
//! 00:10 has been active on two distinct days, regardless of what UTC says.
//!
//! Day comparisons use calendar arithmetic, never elapsed time: two actions
//! 2 hours apart can fall on consecutive days, and two actions 30 hours
//! apart can skip a day entirely.

pub mod types;

pub use types::{DailyStreak, StreakChange, StreakOutcome, DEFAULT_TIMEZONE};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::config::StreakRules;

/// Observes one rewarding action against the streak state.
///
/// Only the first rewarding action of a local day moves the streak (and
/// yields a bonus); later actions the same day are [`StreakChange::Unchanged`]
/// with a zero bonus. A day exactly one calendar day after the last recorded
/// one extends the count; anything else (first action ever, or a gap of two
/// or more days) restarts it at 1.
///
/// The bonus is `rules.bonus_xp[min(count, cap) - 1]` — the count itself is
/// stored unclamped and plateaus only in payout.
pub fn observe(state: &mut DailyStreak, now: DateTime<Utc>, rules: &StreakRules) -> StreakOutcome {
    let today = local_day(state, now);

    let change = match state.last_activity_day {
        Some(last) if last == today => StreakChange::Unchanged,
        Some(last) if last.succ_opt() == Some(today) => StreakChange::Extended,
        _ => StreakChange::Restarted,
    };

    match change {
        StreakChange::Unchanged => StreakOutcome {
            change,
            count: state.count,
            bonus_xp: 0,
        },
        StreakChange::Extended | StreakChange::Restarted => {
            state.count = match change {
                StreakChange::Extended => state.count + 1,
                _ => 1,
            };
            state.last_activity_day = Some(today);
            StreakOutcome {
                change,
                count: state.count,
                bonus_xp: rules.bonus_for(state.count),
            }
        }
    }
}

/// Resolves "now" to a calendar day in the state's timezone.
///
/// An unparseable stored zone falls back to [`DEFAULT_TIMEZONE`] rather than
/// failing the grant; the default itself is a compile-time-known zone name.
fn local_day(state: &DailyStreak, now: DateTime<Utc>) -> NaiveDate {
    let tz: Tz = match state.timezone.parse() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(
                timezone = %state.timezone,
                fallback = DEFAULT_TIMEZONE,
                "unknown streak timezone, using fallback"
            );
            DEFAULT_TIMEZONE.parse().unwrap_or(chrono_tz::UTC)
        }
    };
    now.with_timezone(&tz).date_naive()
}
