//! Data types for the per-user progression aggregate.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievement::AchievementRecord;
use crate::config::Tuning;
use crate::idempotency::GrantKey;
use crate::ledger::LedgerEntry;
use crate::level::LevelState;
use crate::streak::DailyStreak;
use crate::types::{AchievementId, InstructionId, ProgramId, UserId};

/// Grading lifecycle of a practical instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstructionStatus {
    /// Assigned to the learner, no submission yet.
    #[default]
    Assigned,

    /// Submitted, awaiting a grade.
    Submitted,

    /// Graded; eligible for an XP grant.
    Graded,
}

/// Per-program, per-instruction progress record.
///
/// `xp_granted_at` is the dedicated idempotency stamp for instruction
/// grants: it starts null and is written exactly once, at the grant instant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructionProgress {
    /// Where the instruction is in its grading lifecycle.
    pub status: InstructionStatus,

    /// When instruction XP was granted, if it ever was.
    pub xp_granted_at: Option<DateTime<Utc>>,
}

/// The per-user progression aggregate.
///
/// Owned by the host's persistence layer and mutated exclusively by
/// [`Questline`](crate::Questline) — callers never write the fields
/// directly. Created with defaults when a user first earns XP; updated in
/// place for the lifetime of the user, never destroyed.
///
/// Every field is serde-serializable so the aggregate round-trips through
/// whatever store the host uses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProgress {
    /// The user this aggregate belongs to.
    pub user_id: UserId,

    /// Level progression state.
    pub level: LevelState,

    /// Daily activity streak state.
    pub streak: DailyStreak,

    /// Capped, append-only audit trail of XP grants.
    pub ledger: Vec<LedgerEntry>,

    /// Unlocked achievements, in unlock order.
    pub achievements: Vec<AchievementRecord>,

    /// Seen-set of already-rewarded events (idempotency guard).
    pub granted: HashSet<GrantKey>,

    /// Instruction progress records, per program.
    pub instructions: HashMap<ProgramId, HashMap<InstructionId, InstructionProgress>>,
}

impl UserProgress {
    /// Fresh aggregate for a user, in the default timezone.
    pub fn new(user_id: impl Into<UserId>, tuning: &Tuning) -> Self {
        Self {
            user_id: user_id.into(),
            level: LevelState::initial(&tuning.levels),
            streak: DailyStreak::default(),
            ledger: Vec::new(),
            achievements: Vec::new(),
            granted: HashSet::new(),
            instructions: HashMap::new(),
        }
    }

    /// Fresh aggregate with an explicit IANA timezone for the streak day.
    pub fn new_in_timezone(
        user_id: impl Into<UserId>,
        tuning: &Tuning,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            streak: DailyStreak::new(timezone),
            ..Self::new(user_id, tuning)
        }
    }

    /// Returns true if the given grant key was already rewarded.
    pub fn is_granted(&self, key: &GrantKey) -> bool {
        self.granted.contains(key)
    }

    /// Returns true if the achievement is already unlocked.
    pub fn has_achievement(&self, id: &AchievementId) -> bool {
        self.achievements.iter().any(|a| &a.achievement_id == id)
    }

    /// Looks up an instruction progress record.
    pub fn instruction(
        &self,
        program_id: &ProgramId,
        instruction_id: &InstructionId,
    ) -> Option<&InstructionProgress> {
        self.instructions.get(program_id)?.get(instruction_id)
    }

    /// Upserts an instruction progress record.
    ///
    /// Hosts call this as the grading pipeline advances an instruction
    /// through its lifecycle; a grant only succeeds once the record reads
    /// [`InstructionStatus::Graded`]. Re-recording a status never clears an
    /// existing `xp_granted_at` stamp.
    pub fn record_instruction(
        &mut self,
        program_id: impl Into<ProgramId>,
        instruction_id: impl Into<InstructionId>,
        status: InstructionStatus,
    ) {
        let record = self
            .instructions
            .entry(program_id.into())
            .or_default()
            .entry(instruction_id.into())
            .or_default();
        record.status = status;
    }

    pub(crate) fn instruction_mut(
        &mut self,
        program_id: &ProgramId,
        instruction_id: &InstructionId,
    ) -> Option<&mut InstructionProgress> {
        self.instructions.get_mut(program_id)?.get_mut(instruction_id)
    }
}
