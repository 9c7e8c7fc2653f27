//! Tuning tables for the progression engine.
//!
//! [`Tuning`] bundles every read-only table the engine consumes:
//! - per-module lesson XP bases and the duration factor
//! - instruction speed/score bonus rates and clamps
//! - the streak bonus table
//! - the level curve (base threshold plus tiered increments)
//!
//! All tables have sensible defaults matching the shipped game balance. Use
//! struct update syntax to override specific settings:
//!
//! ```rust
//! use questline::{Tuning, LevelCurve};
//!
//! let tuning = Tuning {
//!     levels: LevelCurve {
//!         max_level: 50,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```
//!
//! Tables are plain serde types so hosts can load alternates from their own
//! configuration source; [`Tuning::validate`] is called by
//! [`Questline::new`](crate::Questline::new) before any table is used.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Complete tuning for one engine instance.
///
/// Immutable once handed to [`Questline::new`](crate::Questline::new);
/// deterministic tests construct alternates and pass them in.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tuning {
    /// Lesson completion XP rules.
    pub lesson: LessonRules,

    /// Graded instruction XP rules.
    pub instruction: InstructionRules,

    /// Daily streak bonus rules.
    pub streak: StreakRules,

    /// Level thresholds and cap.
    pub levels: LevelCurve,
}

impl Tuning {
    /// Validates every table.
    ///
    /// Called automatically by `Questline::new()`. You can also call this
    /// explicitly to check tuning loaded from external configuration.
    ///
    /// # Errors
    /// Returns `ValidationError` if any table is empty, a clamp range is
    /// inverted, a rate is negative or non-finite, or the level curve is
    /// malformed (see the per-table `validate` methods).
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.lesson.validate()?;
        self.instruction.validate()?;
        self.streak.validate()?;
        self.levels.validate()?;
        Ok(())
    }
}

/// XP rules for lesson completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonRules {
    /// Base XP per module index. A lesson in module `i` starts from
    /// `module_base_xp[i]`; indexes past the end reuse the last entry so a
    /// catalog gap never blocks a grant.
    pub module_base_xp: Vec<u32>,

    /// Additional factor per 10 minutes of lesson duration.
    ///
    /// `factor = 1 + (duration_secs / 600) * duration_factor_per_10_min`.
    /// A zero duration awards the base only.
    pub duration_factor_per_10_min: f64,

    /// Lower clamp applied to the final amount.
    pub min_xp: u32,

    /// Upper clamp applied to the final amount.
    pub max_xp: u32,
}

impl Default for LessonRules {
    fn default() -> Self {
        Self {
            // Later modules teach harder material and reward more
            module_base_xp: vec![100, 120, 150, 185, 230, 280],
            // +10% per 10 minutes of content
            duration_factor_per_10_min: 0.10,
            min_xp: 50,
            max_xp: 1500,
        }
    }
}

impl LessonRules {
    /// Validates the lesson table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.module_base_xp.is_empty() {
            return Err(ValidationError::empty_table("module_base_xp"));
        }
        if self.min_xp > self.max_xp {
            return Err(ValidationError::invalid_field(
                "lesson.min_xp",
                format!("{} exceeds max_xp {}", self.min_xp, self.max_xp),
            ));
        }
        validate_rate("lesson.duration_factor_per_10_min", self.duration_factor_per_10_min)?;
        Ok(())
    }
}

/// XP rules for graded practical instructions.
///
/// A grant starts from the instruction's catalog `reward_xp`, adds a speed
/// bonus when the submission beat the estimate, and always adds a
/// score-proportional bonus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstructionRules {
    /// Submissions with `time_taken / estimated <= fast_threshold` earn the
    /// fast bonus.
    pub fast_threshold: f64,

    /// Fast bonus as a fraction of `reward_xp`.
    pub fast_bonus_rate: f64,

    /// Submissions above the fast threshold but at or below this ratio earn
    /// the smaller ok bonus. Above it there is no speed bonus.
    pub ok_threshold: f64,

    /// Ok bonus as a fraction of `reward_xp`.
    pub ok_bonus_rate: f64,

    /// Score bonus as a fraction of `reward_xp`, scaled by `score / 100`.
    pub score_bonus_rate: f64,

    /// Lower clamp applied to the final amount.
    pub min_xp: u32,

    /// Upper clamp applied to the final amount.
    pub max_xp: u32,
}

impl Default for InstructionRules {
    fn default() -> Self {
        Self {
            fast_threshold: 0.7,
            fast_bonus_rate: 0.30,
            ok_threshold: 1.2,
            ok_bonus_rate: 0.15,
            score_bonus_rate: 0.5,
            min_xp: 50,
            max_xp: 3000,
        }
    }
}

impl InstructionRules {
    /// Validates thresholds, rates, and clamps.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_xp > self.max_xp {
            return Err(ValidationError::invalid_field(
                "instruction.min_xp",
                format!("{} exceeds max_xp {}", self.min_xp, self.max_xp),
            ));
        }
        validate_rate("instruction.fast_threshold", self.fast_threshold)?;
        validate_rate("instruction.fast_bonus_rate", self.fast_bonus_rate)?;
        validate_rate("instruction.ok_threshold", self.ok_threshold)?;
        validate_rate("instruction.ok_bonus_rate", self.ok_bonus_rate)?;
        validate_rate("instruction.score_bonus_rate", self.score_bonus_rate)?;
        if self.fast_threshold > self.ok_threshold {
            return Err(ValidationError::invalid_field(
                "instruction.fast_threshold",
                format!(
                    "{} exceeds ok_threshold {}",
                    self.fast_threshold, self.ok_threshold
                ),
            ));
        }
        Ok(())
    }
}

/// Daily streak bonus rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreakRules {
    /// Bonus XP per consecutive day, 1-indexed by streak count.
    ///
    /// The streak count itself is never clamped — a streak past the end of
    /// the table keeps growing while the bonus plateaus at the last entry.
    pub bonus_xp: Vec<u32>,
}

impl Default for StreakRules {
    fn default() -> Self {
        Self {
            // Roughly x1.5 per day for the first week
            bonus_xp: vec![25, 38, 57, 86, 129, 194, 291],
        }
    }
}

impl StreakRules {
    /// Validates the bonus table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bonus_xp.is_empty() {
            return Err(ValidationError::empty_table("streak.bonus_xp"));
        }
        Ok(())
    }

    /// Number of days after which the bonus plateaus.
    #[inline]
    pub fn cap(&self) -> u32 {
        self.bonus_xp.len() as u32
    }

    /// Bonus for the given streak count (1-indexed, capped lookup).
    ///
    /// Returns 0 for a count of 0 (no active streak).
    pub fn bonus_for(&self, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        let idx = count.min(self.cap()) as usize - 1;
        self.bonus_xp[idx]
    }
}

/// Level thresholds: a base threshold for level 1 -> 2, then tiered flat
/// increments per level-up.
///
/// The XP needed for each level-up is selected by which [`LevelTier`]
/// bracket the newly reached level falls into; the absolute threshold
/// accumulates by that increment on every level-up. Levels past the last
/// tier reuse the last tier's increment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelCurve {
    /// XP required to go from level 1 to level 2.
    pub base_threshold: u64,

    /// Increment brackets, ordered by `up_to_level` ascending.
    pub tiers: Vec<LevelTier>,

    /// Hard level cap. The level-up loop stops advancing here even while
    /// `experience_total` keeps growing.
    pub max_level: u32,
}

/// One bracket of the level curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    /// Highest level (inclusive) this bracket applies to.
    pub up_to_level: u32,

    /// XP added to the threshold for each level-up inside the bracket.
    pub increment: u64,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base_threshold: 1000,
            tiers: vec![
                LevelTier { up_to_level: 5, increment: 500 },
                LevelTier { up_to_level: 10, increment: 1000 },
                LevelTier { up_to_level: 20, increment: 2000 },
                LevelTier { up_to_level: 30, increment: 3500 },
            ],
            max_level: 30,
        }
    }
}

impl LevelCurve {
    /// Validates the curve.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_threshold == 0 {
            return Err(ValidationError::invalid_field(
                "levels.base_threshold",
                "must be greater than 0",
            ));
        }
        if self.max_level < 1 {
            return Err(ValidationError::invalid_field(
                "levels.max_level",
                "must be at least 1",
            ));
        }
        if self.tiers.is_empty() {
            return Err(ValidationError::empty_table("levels.tiers"));
        }
        let mut prev = 0u32;
        for (i, tier) in self.tiers.iter().enumerate() {
            if tier.increment == 0 {
                return Err(ValidationError::invalid_field(
                    "levels.tiers",
                    format!("tier {} has a zero increment", i),
                ));
            }
            if tier.up_to_level <= prev {
                return Err(ValidationError::invalid_field(
                    "levels.tiers",
                    format!("tier {} is not ordered by up_to_level", i),
                ));
            }
            prev = tier.up_to_level;
        }
        Ok(())
    }

    /// Per-level-up increment for the given (newly reached) level.
    ///
    /// Levels beyond the last tier reuse the last tier's increment, so a
    /// raised `max_level` without a matching tier entry degrades gracefully
    /// instead of failing mid-loop.
    pub fn increment_for(&self, level: u32) -> u64 {
        self.tiers
            .iter()
            .find(|tier| level <= tier.up_to_level)
            .or_else(|| self.tiers.last())
            .map(|tier| tier.increment)
            .unwrap_or(self.base_threshold)
    }
}

fn validate_rate(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid_field(
            field,
            format!("must be a non-negative finite number, got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_default_streak_table() {
        let streak = StreakRules::default();
        assert_eq!(streak.cap(), 7);
        assert_eq!(streak.bonus_for(1), 25);
        assert_eq!(streak.bonus_for(7), 291);
        // Plateau, not reset
        assert_eq!(streak.bonus_for(8), 291);
        assert_eq!(streak.bonus_for(10_000), 291);
        assert_eq!(streak.bonus_for(0), 0);
    }

    #[test]
    fn test_empty_lesson_table_rejected() {
        let tuning = Tuning {
            lesson: LessonRules {
                module_base_xp: vec![],
                ..Default::default()
            },
            ..Default::default()
        };
        let err = tuning.validate().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyTable { table } if table == "module_base_xp"));
    }

    #[test]
    fn test_inverted_clamp_rejected() {
        let rules = InstructionRules {
            min_xp: 5000,
            max_xp: 3000,
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let rules = InstructionRules {
            score_bonus_rate: -0.5,
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_fast_threshold_above_ok_rejected() {
        let rules = InstructionRules {
            fast_threshold: 1.5,
            ok_threshold: 1.2,
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_unordered_tiers_rejected() {
        let curve = LevelCurve {
            tiers: vec![
                LevelTier { up_to_level: 10, increment: 500 },
                LevelTier { up_to_level: 5, increment: 1000 },
            ],
            ..Default::default()
        };
        assert!(curve.validate().is_err());
    }

    #[test]
    fn test_increment_selection() {
        let curve = LevelCurve::default();
        assert_eq!(curve.increment_for(2), 500);
        assert_eq!(curve.increment_for(5), 500);
        assert_eq!(curve.increment_for(6), 1000);
        assert_eq!(curve.increment_for(20), 2000);
        assert_eq!(curve.increment_for(30), 3500);
        // Past the last tier: reuse the last increment
        assert_eq!(curve.increment_for(99), 3500);
    }

    #[test]
    fn test_tuning_json_roundtrip() {
        let tuning = Tuning::default();
        let json = serde_json::to_string(&tuning).unwrap();
        let restored: Tuning = serde_json::from_str(&json).unwrap();
        assert!(restored.validate().is_ok());
        assert_eq!(restored.streak.bonus_xp, tuning.streak.bonus_xp);
        assert_eq!(restored.levels.max_level, tuning.levels.max_level);
    }
}
