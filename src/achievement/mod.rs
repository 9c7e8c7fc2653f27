//! Achievement definitions and the fixed-point unlock loop.
//!
//! Unlocking cascades: an achievement's flat XP reward can push the total
//! over a level threshold, and the resulting level can satisfy a later
//! achievement's predicate. [`unlock`] therefore re-evaluates the whole
//! definition set until a pass unlocks nothing — the fixed point — with a
//! defensive ceiling on pass count in case a predicate misbehaves.

pub mod types;

pub use types::{AchievementDef, AchievementRecord, Predicate, PredicateError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::LevelCurve;
use crate::error::ValidationError;
use crate::idempotency::GrantKey;
use crate::ledger::{self, LedgerEntryKind};
use crate::level;
use crate::profile::UserProgress;
use crate::types::AchievementId;

/// An ordered, immutable set of achievement definitions.
///
/// Order is unlock order and must be stable across runs; IDs must be
/// unique. Build one at startup and share it with the engine.
#[derive(Debug)]
pub struct AchievementSet {
    defs: Vec<AchievementDef>,
}

impl AchievementSet {
    /// Creates a set from ordered definitions.
    ///
    /// # Errors
    /// Returns `ValidationError` if two definitions share an ID.
    pub fn new(defs: Vec<AchievementDef>) -> Result<Self, ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for def in &defs {
            if !seen.insert(def.id.clone()) {
                return Err(ValidationError::invalid_field(
                    "achievements",
                    format!("duplicate achievement id '{}'", def.id),
                ));
            }
        }
        Ok(Self { defs })
    }

    /// An empty set (no achievements ever unlock).
    pub fn empty() -> Self {
        Self { defs: Vec::new() }
    }

    /// The built-in definition set shipped with the engine.
    ///
    /// Early-learner firsts, streak milestones, level milestones, and
    /// lifetime-XP milestones. The XP milestones can themselves be crossed
    /// by unlock rewards, which is exactly what the fixed-point loop exists
    /// to absorb.
    pub fn builtin() -> Self {
        Self {
            defs: vec![
                AchievementDef::new("first-lesson", 50, |p: &UserProgress| {
                    Ok(p.granted
                        .iter()
                        .any(|k| matches!(k, GrantKey::Lesson { .. })))
                }),
                AchievementDef::new("first-instruction", 75, |p: &UserProgress| {
                    Ok(p.granted
                        .iter()
                        .any(|k| matches!(k, GrantKey::Instruction { .. })))
                }),
                AchievementDef::new("streak-3", 100, |p: &UserProgress| Ok(p.streak.count >= 3)),
                AchievementDef::new("streak-7", 250, |p: &UserProgress| Ok(p.streak.count >= 7)),
                AchievementDef::new("streak-30", 1000, |p: &UserProgress| {
                    Ok(p.streak.count >= 30)
                }),
                AchievementDef::new("level-5", 200, |p: &UserProgress| {
                    Ok(p.level.current_level >= 5)
                }),
                AchievementDef::new("level-10", 500, |p: &UserProgress| {
                    Ok(p.level.current_level >= 10)
                }),
                AchievementDef::new("level-20", 1500, |p: &UserProgress| {
                    Ok(p.level.current_level >= 20)
                }),
                AchievementDef::new("xp-10000", 500, |p: &UserProgress| {
                    Ok(p.level.experience_total >= 10_000)
                }),
                AchievementDef::new("xp-100000", 2000, |p: &UserProgress| {
                    Ok(p.level.experience_total >= 100_000)
                }),
            ],
        }
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns true if the set has no definitions.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterates definitions in unlock order.
    pub fn iter(&self) -> impl Iterator<Item = &AchievementDef> {
        self.defs.iter()
    }

    /// Looks up a definition by ID.
    pub fn get(&self, id: &AchievementId) -> Option<&AchievementDef> {
        self.defs.iter().find(|d| &d.id == id)
    }
}

/// Runs the fixed-point unlock loop against the aggregate.
///
/// Each pass evaluates every still-locked predicate (in definition order)
/// against the current, possibly already-mutated-this-call state, applies
/// all unlocks from the pass, then settles level-ups once. The loop ends
/// when a pass unlocks nothing. Since a continuing pass must have unlocked
/// at least one definition, `len + 1` passes is a hard ceiling; hitting it
/// is logged and means a predicate is misbehaving.
///
/// A predicate error is isolated: logged, counted as "not satisfied this
/// pass", and the remaining predicates still run.
///
/// Returns the newly unlocked records in unlock order.
pub fn unlock(
    set: &AchievementSet,
    profile: &mut UserProgress,
    curve: &LevelCurve,
    now: DateTime<Utc>,
) -> Vec<AchievementRecord> {
    let mut newly_unlocked = Vec::new();
    let max_passes = set.len() + 1;

    for pass in 0..max_passes {
        let satisfied: Vec<&AchievementDef> = set
            .iter()
            .filter(|def| !profile.has_achievement(&def.id))
            .filter(|def| match (def.predicate)(profile) {
                Ok(satisfied) => satisfied,
                Err(err) => {
                    warn!(
                        achievement = %def.id,
                        error = %err,
                        "achievement predicate failed, treating as not satisfied"
                    );
                    false
                }
            })
            .collect();

        if satisfied.is_empty() {
            debug!(pass, unlocked = newly_unlocked.len(), "unlock fixed point reached");
            return newly_unlocked;
        }

        for def in satisfied {
            let record = AchievementRecord {
                achievement_id: def.id.clone(),
                unlocked_at: now,
                xp_reward: def.xp_reward,
            };
            profile.achievements.push(record.clone());

            if def.xp_reward > 0 {
                // Flat reward, added directly: unlock rewards bypass the rule engine
                profile.level.experience_total += u64::from(def.xp_reward);
                ledger::append(
                    &mut profile.ledger,
                    LedgerEntryKind::AchievementUnlocked {
                        achievement_id: def.id.clone(),
                    },
                    def.xp_reward,
                    now,
                );
            }

            info!(achievement = %def.id, xp = def.xp_reward, "achievement unlocked");
            newly_unlocked.push(record);
        }

        // One settle absorbs every level-up accumulated during the pass
        level::apply_gain(&mut profile.level, 0, curve);
    }

    warn!(
        passes = max_passes,
        "achievement unlock loop hit its pass ceiling"
    );
    newly_unlocked
}
