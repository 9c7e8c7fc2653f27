//! Level progression: applying XP gains and resolving level-ups.
//!
//! [`apply_gain`] is the single entry point for mutating a [`LevelState`].
//! It absorbs any number of level-ups from one gain (a large grant can cross
//! several thresholds in a single call) and stops hard at the curve's
//! `max_level`, after which `experience_total` keeps growing while the level
//! stays put.

pub mod types;

pub use types::LevelState;

use crate::config::LevelCurve;

/// Applies a net XP gain and resolves any resulting level-ups.
///
/// The level-up loop runs while `experience_total` has passed
/// `experience_next_level` and the cap hasn't been reached; each iteration
/// shifts the band up by the tiered increment for the newly reached level.
/// `progress_percent` is recomputed afterwards regardless of how many
/// iterations ran.
///
/// Passing a gain of 0 re-settles a state whose total was bumped directly
/// (achievement rewards are added flat, outside this module).
pub fn apply_gain(state: &mut LevelState, amount: u64, curve: &LevelCurve) {
    state.experience_total += amount;

    while state.experience_total >= state.experience_next_level
        && state.current_level < curve.max_level
    {
        state.current_level += 1;
        state.experience_current_level = state.experience_next_level;
        state.experience_next_level += curve.increment_for(state.current_level);
    }

    state.progress_percent = progress_percent(state);
}

/// Derives the progress percentage from the three stored XP fields.
///
/// 0 when the total sits at or below the band floor, 100 when it has passed
/// the next threshold (only reachable at the level cap), proportional and
/// rounded in between.
fn progress_percent(state: &LevelState) -> u8 {
    if state.experience_total <= state.experience_current_level {
        return 0;
    }
    if state.experience_total >= state.experience_next_level {
        return 100;
    }
    let band = (state.experience_next_level - state.experience_current_level) as f64;
    let into = (state.experience_total - state.experience_current_level) as f64;
    (into / band * 100.0).round() as u8
}
