//! Data types for the XP ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{AchievementId, EntryId, InstructionId, LessonId, ProgramId};

/// One XP-granting event in a user's ledger.
///
/// The ledger is an append-only audit trail capped at
/// [`LEDGER_CAP`](crate::ledger::LEDGER_CAP) entries, oldest trimmed first.
/// Idempotency is NOT derived from it — the aggregate's seen-set survives
/// trimming (see [`GrantKey`](crate::idempotency::GrantKey)).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Time-ordered entry identifier.
    pub id: EntryId,

    /// What was rewarded, with its event-specific payload.
    pub kind: LedgerEntryKind,

    /// XP granted by this entry.
    pub xp: u32,

    /// Grant instant.
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates an entry with a fresh time-ordered ID.
    pub fn new(kind: LedgerEntryKind, xp: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::new(),
            kind,
            xp,
            timestamp,
        }
    }

    /// Event-specific payload rendered as JSON for audit display.
    pub fn meta(&self) -> Value {
        self.kind.meta()
    }
}

/// Kind of a ledger entry plus its event-specific payload.
///
/// Serializes with a `type` tag matching the wire names the host exposes
/// (`LESSON_COMPLETED`, `INSTRUCTION_GRADED`, `DAILY_STREAK_BONUS`,
/// `ACHIEVEMENT_UNLOCKED`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    /// A lesson was completed for the first time.
    LessonCompleted {
        /// Program the lesson belongs to.
        program_id: ProgramId,
        /// The completed lesson.
        lesson_id: LessonId,
    },

    /// A graded practical instruction was rewarded.
    InstructionGraded {
        /// Program the instruction belongs to.
        program_id: ProgramId,
        /// The rewarded instruction.
        instruction_id: InstructionId,
    },

    /// The first rewarding action of a local day extended or restarted the
    /// streak.
    DailyStreakBonus {
        /// The local calendar day that was counted.
        day: NaiveDate,
        /// Streak count after the day was counted.
        streak_count: u32,
    },

    /// An achievement unlock granted its flat reward.
    AchievementUnlocked {
        /// The unlocked achievement.
        achievement_id: AchievementId,
    },
}

impl LedgerEntryKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonCompleted { .. } => "LESSON_COMPLETED",
            Self::InstructionGraded { .. } => "INSTRUCTION_GRADED",
            Self::DailyStreakBonus { .. } => "DAILY_STREAK_BONUS",
            Self::AchievementUnlocked { .. } => "ACHIEVEMENT_UNLOCKED",
        }
    }

    /// Event-specific payload as JSON.
    pub fn meta(&self) -> Value {
        match self {
            Self::LessonCompleted {
                program_id,
                lesson_id,
            } => json!({ "programId": program_id, "lessonId": lesson_id }),
            Self::InstructionGraded {
                program_id,
                instruction_id,
            } => json!({ "programId": program_id, "instructionId": instruction_id }),
            Self::DailyStreakBonus { day, streak_count } => {
                json!({ "day": day, "streakCount": streak_count })
            }
            Self::AchievementUnlocked { achievement_id } => {
                json!({ "achievementId": achievement_id })
            }
        }
    }
}
