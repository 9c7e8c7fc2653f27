//! XP rule computation for rewardable events.
//!
//! Both functions here are pure and total: any combination of numeric inputs
//! produces an amount inside the configured clamp range, never an error. A
//! data-entry gap in the catalog (module index past the table, zero
//! duration, zero reward) degrades to a safe default rather than blocking a
//! learner's grant.
//!
//! Rounding is round-half-away-from-zero on non-negative values
//! (`f64::round`); clamping happens once, on the final raw sum.

use crate::config::{InstructionRules, LessonRules};

/// Seconds per table unit of the lesson duration factor.
const DURATION_UNIT_SECS: f64 = 600.0;

/// Computes XP for a completed lesson.
///
/// The base amount comes from the per-module-index table; a `module_index`
/// past the end reuses the last entry. The base is then scaled by
/// `1 + (duration_secs / 600) * duration_factor_per_10_min` — a zero
/// duration awards the base alone.
///
/// # Example
/// ```rust
/// use questline::rules::lesson_xp;
/// use questline::LessonRules;
///
/// let rules = LessonRules::default();
/// // Module 0, 10-minute lesson: round(100 * 1.1) = 110
/// assert_eq!(lesson_xp(&rules, 0, 600), 110);
/// ```
pub fn lesson_xp(rules: &LessonRules, module_index: usize, duration_secs: u32) -> u32 {
    let base = match rules.module_base_xp.get(module_index) {
        Some(base) => *base,
        // Module index past the table: reuse the last entry
        None => match rules.module_base_xp.last() {
            Some(base) => *base,
            None => 0,
        },
    };

    let factor = 1.0 + (f64::from(duration_secs) / DURATION_UNIT_SECS) * rules.duration_factor_per_10_min;
    let raw = (f64::from(base) * factor).round();

    clamp_xp(raw, rules.min_xp, rules.max_xp)
}

/// Computes XP for a graded practical instruction.
///
/// Starts from the instruction's catalog `reward_xp` and adds two
/// independent bonuses:
///
/// - **Speed**: when both time fields are positive,
///   `ratio = time_taken / estimated`. A ratio at or below the fast
///   threshold earns `round(reward_xp * fast_bonus_rate)`; at or below the
///   ok threshold, `round(reward_xp * ok_bonus_rate)`; above it, nothing.
///   A slow submission loses the bonus entirely but never goes negative.
/// - **Score**: always `round(reward_xp * score_bonus_rate * score / 100)`,
///   with the score clamped to 0..=100 first.
///
/// The summed total is clamped once to `[min_xp, max_xp]`.
pub fn instruction_xp(
    rules: &InstructionRules,
    reward_xp: u32,
    score: u32,
    time_taken_secs: u32,
    estimated_secs: u32,
) -> u32 {
    let reward = f64::from(reward_xp);
    let mut raw = reward;

    if time_taken_secs > 0 && estimated_secs > 0 {
        let ratio = f64::from(time_taken_secs) / f64::from(estimated_secs);
        if ratio <= rules.fast_threshold {
            raw += (reward * rules.fast_bonus_rate).round();
        } else if ratio <= rules.ok_threshold {
            raw += (reward * rules.ok_bonus_rate).round();
        }
        // Above ok_threshold: no speed bonus
    }

    let score = f64::from(score.min(100));
    raw += (reward * rules.score_bonus_rate * score / 100.0).round();

    clamp_xp(raw, rules.min_xp, rules.max_xp)
}

/// Clamps a raw (non-negative, already rounded) amount into `[min, max]`.
fn clamp_xp(raw: f64, min: u32, max: u32) -> u32 {
    if raw <= f64::from(min) {
        min
    } else if raw >= f64::from(max) {
        max
    } else {
        raw as u32
    }
}
