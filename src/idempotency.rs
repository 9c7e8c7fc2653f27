//! Idempotency keys for XP grants.
//!
//! The source of truth for "has this event already been rewarded" is one
//! seen-set of [`GrantKey`]s carried on the aggregate. Lessons key by
//! lesson ID alone; instructions key by `(program, instruction)`. The set is
//! persistent state — unlike a ledger scan it does not decay when old
//! entries are trimmed, so a lesson completed 2000 grants ago still rejects
//! a replay.
//!
//! Instruction grants additionally require the instruction's progress record
//! to exist in `Graded` status with a null `xp_granted_at` (see
//! [`InstructionProgress`](crate::profile::InstructionProgress)); both
//! mechanisms are kept in sync by the engine.

use serde::{Deserialize, Serialize};

use crate::types::{InstructionId, LessonId, ProgramId};

/// Identity of a rewardable event for at-most-once granting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantKey {
    /// A lesson completion; each lesson rewards XP at most once per user.
    Lesson {
        /// The completed lesson.
        lesson_id: LessonId,
    },

    /// A graded instruction; keyed per program since instruction IDs are
    /// only unique within one.
    Instruction {
        /// Program the instruction belongs to.
        program_id: ProgramId,
        /// The graded instruction.
        instruction_id: InstructionId,
    },
}

impl GrantKey {
    /// Key for a lesson completion.
    pub fn lesson(lesson_id: impl Into<LessonId>) -> Self {
        Self::Lesson {
            lesson_id: lesson_id.into(),
        }
    }

    /// Key for a graded instruction.
    pub fn instruction(
        program_id: impl Into<ProgramId>,
        instruction_id: impl Into<InstructionId>,
    ) -> Self {
        Self::Instruction {
            program_id: program_id.into(),
            instruction_id: instruction_id.into(),
        }
    }
}
