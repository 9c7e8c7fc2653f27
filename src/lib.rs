//! # Questline
//!
//! Progression engine for gamified learning platforms — the deterministic
//! core that converts discrete learner actions (lesson completions, graded
//! practical instructions) into persistent progression state: XP, levels,
//! daily streaks, and achievement unlocks.
//!
//! ## Quick Start
//!
//! ```rust
//! use questline::{Questline, XpEvent, ProgramId, LessonId};
//!
//! // Build an engine with the shipped tuning and builtin achievements
//! let engine = Questline::with_defaults();
//!
//! // Materialize a user's aggregate (hosts usually load this from storage)
//! let mut profile = engine.new_profile("user-1");
//!
//! // Grant XP for a completed lesson
//! let outcome = engine.add_experience(&mut profile, &XpEvent::LessonCompleted {
//!     program_id: ProgramId::new("rust-101"),
//!     lesson_id: LessonId::new("ownership-basics"),
//!     module_index: 0,
//!     duration_secs: 900,
//! })?;
//!
//! assert!(outcome.gained > 0);
//! assert_eq!(outcome.total_gain, outcome.gained + outcome.streak_bonus);
//!
//! // Replays are silent no-ops, not errors
//! let replay = engine.add_experience(&mut profile, &XpEvent::LessonCompleted {
//!     program_id: ProgramId::new("rust-101"),
//!     lesson_id: LessonId::new("ownership-basics"),
//!     module_index: 0,
//!     duration_secs: 900,
//! })?;
//! assert!(replay.is_duplicate());
//! # Ok::<(), questline::QuestlineError>(())
//! ```
//!
//! ## Key Concepts
//!
//! ### Grant
//!
//! One call to [`Questline::add_experience`] applies one rewardable event to
//! one user's [`UserProgress`] aggregate: idempotency check, rule
//! computation, streak observation, level progression, ledger append, then
//! the achievement fixed point. The step order is part of the contract —
//! achievement predicates see the post-grant streak and level.
//!
//! ### Aggregate
//!
//! [`UserProgress`] is the unit of persistence: level state, streak state, a
//! capped XP ledger, unlocked achievements, the idempotency seen-set, and
//! instruction progress records. The crate performs no I/O — hosts load the
//! aggregate, call the engine, and store what comes back. Everything is
//! serde-serializable.
//!
//! ### Tuning
//!
//! Every number the engine uses (lesson bases, bonus rates, streak table,
//! level curve) lives in an immutable [`Tuning`] value validated at engine
//! construction, so tests can run alternate game balance deterministically.
//!
//! ## Thread Safety
//!
//! [`Questline`] is stateless, `Send + Sync`, and shared freely. Aggregates
//! assume a single writer per grant; [`ProfileStore`] provides per-user
//! serialization for in-process embedders, and hosts with external
//! persistence must serialize per user at their own boundary (keyed mutex,
//! or optimistic versioned writes with retry).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![forbid(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

mod config;
mod engine;
mod error;
mod store;
mod types;

// Domain modules
pub mod achievement;
pub mod idempotency;
pub mod ledger;
pub mod level;
pub mod profile;
pub mod rules;
pub mod streak;

// ============================================================================
// Public API re-exports
// ============================================================================

// Main engine interface
pub use engine::{GrantOutcome, Questline, XpEvent};

// In-memory store
pub use store::ProfileStore;

// Configuration
pub use config::{
    InstructionRules, LessonRules, LevelCurve, LevelTier, StreakRules, Tuning,
};

// Error handling
pub use error::{NotFoundError, QuestlineError, Result, ValidationError};

// Core types
pub use types::{AchievementId, EntryId, InstructionId, LessonId, ProgramId, UserId};

// Domain types
pub use achievement::{AchievementDef, AchievementRecord, AchievementSet, PredicateError};
pub use idempotency::GrantKey;
pub use ledger::{LedgerEntry, LedgerEntryKind, LEDGER_CAP};
pub use level::LevelState;
pub use profile::{InstructionProgress, InstructionStatus, UserProgress};
pub use streak::{DailyStreak, StreakChange, StreakOutcome, DEFAULT_TIMEZONE};

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Convenient imports for common questline usage.
///
/// ```rust
/// use questline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Tuning;
    pub use crate::engine::{GrantOutcome, Questline, XpEvent};
    pub use crate::error::{QuestlineError, Result};
    pub use crate::profile::{InstructionStatus, UserProgress};
    pub use crate::store::ProfileStore;
    pub use crate::types::{InstructionId, LessonId, ProgramId, UserId};
}
