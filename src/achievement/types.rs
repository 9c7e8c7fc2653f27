//! Data types for achievement definitions and unlock records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::UserProgress;
use crate::types::AchievementId;

/// Error raised by an achievement predicate.
///
/// A failing predicate never aborts the surrounding grant: the engine logs
/// it and treats the achievement as not satisfied for the pass.
#[derive(Debug, Error)]
#[error("Predicate error: {0}")]
pub struct PredicateError(pub String);

impl PredicateError {
    /// Creates a predicate error with the given message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Unlock predicate: a pure function over the user's aggregate.
///
/// Predicates are registered once at startup as part of an
/// [`AchievementSet`] — never constructed at evaluation time — so unlock
/// behavior is deterministic across runs.
pub type Predicate = Box<dyn Fn(&UserProgress) -> Result<bool, PredicateError> + Send + Sync>;

/// One achievement definition.
///
/// Definition order within an [`AchievementSet`] is significant: it is the
/// deterministic unlock order within a pass.
pub struct AchievementDef {
    /// Stable achievement identifier.
    pub id: AchievementId,

    /// Flat XP granted on unlock (may be 0). Added directly to the total,
    /// bypassing the rule engine.
    pub xp_reward: u32,

    /// Unlock predicate.
    pub predicate: Predicate,
}

impl AchievementDef {
    /// Creates a definition from an ID, reward, and predicate.
    pub fn new(
        id: impl Into<AchievementId>,
        xp_reward: u32,
        predicate: impl Fn(&UserProgress) -> Result<bool, PredicateError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            xp_reward,
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for AchievementDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AchievementDef")
            .field("id", &self.id)
            .field("xp_reward", &self.xp_reward)
            .finish_non_exhaustive()
    }
}

/// A user's unlocked achievement.
///
/// `xp_reward` is snapshotted at unlock time: re-tuning a definition later
/// never rewrites history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementRecord {
    /// The unlocked achievement.
    pub achievement_id: AchievementId,

    /// When it was unlocked.
    pub unlocked_at: DateTime<Utc>,

    /// XP that was granted for the unlock.
    pub xp_reward: u32,
}
