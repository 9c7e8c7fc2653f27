//! The `Questline` engine: orchestration of one XP grant.
//!
//! [`Questline`] is the primary interface of the crate. It owns the
//! validated tuning tables and the ordered achievement set, and applies one
//! caller-supplied [`XpEvent`] to one [`UserProgress`] aggregate at a time.
//!
//! # Grant protocol
//!
//! The steps of [`add_experience`](Questline::add_experience) run in a fixed
//! order, because later steps read state mutated by earlier ones (achievement
//! predicates must see the post-grant streak and level):
//!
//! 1. idempotency check — short-circuits with a zero outcome, touching nothing
//! 2. rule computation — base XP for the event
//! 3. streak observation — bonus XP, streak state mutated here only
//! 4. level progression — applied with base + bonus
//! 5. ledger append — base entry, plus a streak bonus entry when earned
//! 6. achievement fixed point — unlocks, flat rewards, more level-ups
//!
//! # Concurrency
//!
//! The engine holds no mutable state of its own and is `Send + Sync`; one
//! instance serves every user. It does assume a single writer per aggregate
//! within a call — see [`ProfileStore`](crate::ProfileStore) for the keyed
//! serialization embedders need when callers race on the same user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::achievement::{self, AchievementRecord, AchievementSet};
use crate::config::Tuning;
use crate::error::{NotFoundError, QuestlineError, Result, ValidationError};
use crate::idempotency::GrantKey;
use crate::ledger::{self, LedgerEntryKind};
use crate::level::{self, LevelState};
use crate::profile::{InstructionStatus, UserProgress};
use crate::rules;
use crate::streak::{self, DailyStreak};
use crate::types::{InstructionId, LessonId, ProgramId};

/// A rewardable learner action.
///
/// The two supported kinds are a closed enum: an unknown event type is
/// unrepresentable in Rust and rejected as an unknown `type` tag at the
/// serde boundary for hosts that deserialize events from their transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XpEvent {
    /// A lesson was completed.
    LessonCompleted {
        /// Program the lesson belongs to.
        program_id: ProgramId,
        /// The completed lesson (idempotency key).
        lesson_id: LessonId,
        /// Zero-based module index within the program.
        module_index: usize,
        /// Lesson duration in seconds; 0 when unknown.
        duration_secs: u32,
    },

    /// A practical instruction was graded.
    InstructionGraded {
        /// Program the instruction belongs to.
        program_id: ProgramId,
        /// The graded instruction (idempotency key, with the program).
        instruction_id: InstructionId,
        /// Catalog base reward for the instruction; 0 for a catalog gap.
        reward_xp: u32,
        /// Grade, 0..=100 (values above 100 are clamped).
        score: u32,
        /// Seconds the learner took; 0 when unknown.
        time_taken_secs: u32,
        /// Catalog time estimate in seconds; 0 when unknown.
        estimated_secs: u32,
    },
}

impl XpEvent {
    /// The idempotency key identifying this event.
    pub fn grant_key(&self) -> GrantKey {
        match self {
            Self::LessonCompleted { lesson_id, .. } => GrantKey::Lesson {
                lesson_id: lesson_id.clone(),
            },
            Self::InstructionGraded {
                program_id,
                instruction_id,
                ..
            } => GrantKey::Instruction {
                program_id: program_id.clone(),
                instruction_id: instruction_id.clone(),
            },
        }
    }

    /// The wire name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonCompleted { .. } => "LESSON_COMPLETED",
            Self::InstructionGraded { .. } => "INSTRUCTION_GRADED",
        }
    }
}

/// Result of one grant, returned synchronously for response composition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrantOutcome {
    /// Base XP computed by the rule engine (0 on an idempotency hit).
    pub gained: u32,

    /// Streak bonus XP (0 on an idempotency hit or a same-day action).
    pub streak_bonus: u32,

    /// `gained + streak_bonus` — the amount level progression was fed.
    /// Achievement rewards are NOT included here; they appear in
    /// `achievements_unlocked` and in the returned `level` totals.
    pub total_gain: u32,

    /// Level state after the grant.
    pub level: LevelState,

    /// Streak state after the grant.
    pub streak: DailyStreak,

    /// Achievements newly unlocked by this grant, in unlock order.
    pub achievements_unlocked: Vec<AchievementRecord>,
}

impl GrantOutcome {
    /// Returns true if this was an idempotency hit (nothing was granted).
    ///
    /// A real grant can never be all-zero: rule amounts are clamped to a
    /// positive minimum.
    pub fn is_duplicate(&self) -> bool {
        self.total_gain == 0 && self.achievements_unlocked.is_empty()
    }

    fn duplicate(profile: &UserProgress) -> Self {
        Self {
            gained: 0,
            streak_bonus: 0,
            total_gain: 0,
            level: profile.level.clone(),
            streak: profile.streak.clone(),
            achievements_unlocked: Vec::new(),
        }
    }
}

/// The progression engine.
///
/// Holds the validated [`Tuning`] and the ordered [`AchievementSet`];
/// stateless otherwise. Construct once at startup and share freely.
#[derive(Debug)]
pub struct Questline {
    tuning: Tuning,
    achievements: AchievementSet,
}

impl Questline {
    /// Creates an engine from tuning tables and an achievement set.
    ///
    /// # Errors
    /// Returns an error if any tuning table fails [`Tuning::validate`].
    pub fn new(tuning: Tuning, achievements: AchievementSet) -> Result<Self> {
        tuning.validate().map_err(QuestlineError::from)?;
        Ok(Self {
            tuning,
            achievements,
        })
    }

    /// Engine with the shipped tuning and the builtin achievement set.
    pub fn with_defaults() -> Self {
        // Default tables are valid by construction (covered by config tests)
        Self {
            tuning: Tuning::default(),
            achievements: AchievementSet::builtin(),
        }
    }

    /// The tuning tables this engine runs with.
    #[inline]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// The achievement definitions this engine runs with.
    #[inline]
    pub fn achievements(&self) -> &AchievementSet {
        &self.achievements
    }

    /// Materializes a fresh aggregate for a user.
    pub fn new_profile(&self, user_id: impl Into<crate::types::UserId>) -> UserProgress {
        UserProgress::new(user_id, &self.tuning)
    }

    /// Applies one rewardable event to the aggregate, stamped with the
    /// current instant.
    ///
    /// See the module docs for the grant protocol. Returns a zero-gain
    /// outcome (not an error) when the event was already rewarded.
    ///
    /// # Errors
    ///
    /// - `Validation` — an empty identifier in the payload, or an
    ///   instruction that is not yet `Graded`
    /// - `NotFound` — an instruction grant with no progress record
    ///
    /// All error paths reject before any state is touched.
    #[instrument(skip(self, profile), fields(user = %profile.user_id, event = event.as_str()))]
    pub fn add_experience(
        &self,
        profile: &mut UserProgress,
        event: &XpEvent,
    ) -> Result<GrantOutcome> {
        self.add_experience_at(profile, event, Utc::now())
    }

    /// [`add_experience`](Self::add_experience) with an explicit instant.
    ///
    /// The instant determines the streak day (in the aggregate's timezone)
    /// and every timestamp written by the grant; deterministic tests drive
    /// whole weeks through this.
    pub fn add_experience_at(
        &self,
        profile: &mut UserProgress,
        event: &XpEvent,
        now: DateTime<Utc>,
    ) -> Result<GrantOutcome> {
        validate_event(event)?;

        // 1. Idempotency: reject replays before touching anything
        let key = event.grant_key();
        if profile.is_granted(&key) {
            debug!("duplicate grant, returning zero outcome");
            return Ok(GrantOutcome::duplicate(profile));
        }
        if let XpEvent::InstructionGraded {
            program_id,
            instruction_id,
            ..
        } = event
        {
            let record = profile
                .instruction(program_id, instruction_id)
                .ok_or_else(|| {
                    NotFoundError::instruction(program_id.clone(), instruction_id.clone())
                })?;
            if record.status != InstructionStatus::Graded {
                return Err(
                    ValidationError::not_graded(program_id.clone(), instruction_id.clone()).into(),
                );
            }
            if record.xp_granted_at.is_some() {
                debug!("instruction already rewarded, returning zero outcome");
                return Ok(GrantOutcome::duplicate(profile));
            }
        }

        // 2. Rule engine: base amount for the event
        let gained = match event {
            XpEvent::LessonCompleted {
                module_index,
                duration_secs,
                ..
            } => rules::lesson_xp(&self.tuning.lesson, *module_index, *duration_secs),
            XpEvent::InstructionGraded {
                reward_xp,
                score,
                time_taken_secs,
                estimated_secs,
                ..
            } => rules::instruction_xp(
                &self.tuning.instruction,
                *reward_xp,
                *score,
                *time_taken_secs,
                *estimated_secs,
            ),
        };

        // 3. Streak: mutated only on this non-duplicate path
        let streak_outcome = streak::observe(&mut profile.streak, now, &self.tuning.streak);
        let total_gain = gained + streak_outcome.bonus_xp;

        // 4. Level progression with the combined gain
        let level_before = profile.level.current_level;
        level::apply_gain(&mut profile.level, u64::from(total_gain), &self.tuning.levels);
        if profile.level.current_level > level_before {
            info!(
                from = level_before,
                to = profile.level.current_level,
                "level up"
            );
        }

        // 5. Ledger: base entry, then the streak bonus as its own entry
        ledger::append(&mut profile.ledger, base_entry_kind(event), gained, now);
        if streak_outcome.bonus_xp > 0 {
            if let Some(day) = profile.streak.last_activity_day {
                ledger::append(
                    &mut profile.ledger,
                    LedgerEntryKind::DailyStreakBonus {
                        day,
                        streak_count: streak_outcome.count,
                    },
                    streak_outcome.bonus_xp,
                    now,
                );
            }
        }
        ledger::trim(&mut profile.ledger);

        // Mark the event rewarded: seen-set, plus the instruction stamp
        profile.granted.insert(key);
        if let XpEvent::InstructionGraded {
            program_id,
            instruction_id,
            ..
        } = event
        {
            if let Some(record) = profile.instruction_mut(program_id, instruction_id) {
                record.xp_granted_at = Some(now);
            }
        }

        // 6. Achievements: fixed point over unlocks and their level-ups
        let achievements_unlocked =
            achievement::unlock(&self.achievements, profile, &self.tuning.levels, now);
        ledger::trim(&mut profile.ledger);

        info!(
            gained,
            streak_bonus = streak_outcome.bonus_xp,
            total_gain,
            level = profile.level.current_level,
            unlocked = achievements_unlocked.len(),
            "experience granted"
        );

        Ok(GrantOutcome {
            gained,
            streak_bonus: streak_outcome.bonus_xp,
            total_gain,
            level: profile.level.clone(),
            streak: profile.streak.clone(),
            achievements_unlocked,
        })
    }
}

/// Ledger entry kind for the base grant of an event.
fn base_entry_kind(event: &XpEvent) -> LedgerEntryKind {
    match event {
        XpEvent::LessonCompleted {
            program_id,
            lesson_id,
            ..
        } => LedgerEntryKind::LessonCompleted {
            program_id: program_id.clone(),
            lesson_id: lesson_id.clone(),
        },
        XpEvent::InstructionGraded {
            program_id,
            instruction_id,
            ..
        } => LedgerEntryKind::InstructionGraded {
            program_id: program_id.clone(),
            instruction_id: instruction_id.clone(),
        },
    }
}

/// Rejects payloads with empty identifiers before any state is touched.
fn validate_event(event: &XpEvent) -> Result<()> {
    match event {
        XpEvent::LessonCompleted {
            program_id,
            lesson_id,
            ..
        } => {
            if program_id.as_str().is_empty() {
                return Err(ValidationError::required_field("program_id").into());
            }
            if lesson_id.as_str().is_empty() {
                return Err(ValidationError::required_field("lesson_id").into());
            }
        }
        XpEvent::InstructionGraded {
            program_id,
            instruction_id,
            ..
        } => {
            if program_id.as_str().is_empty() {
                return Err(ValidationError::required_field("program_id").into());
            }
            if instruction_id.as_str().is_empty() {
                return Err(ValidationError::required_field("instruction_id").into());
            }
        }
    }
    Ok(())
}
