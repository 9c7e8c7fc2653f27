//! The per-user progression aggregate.
//!
//! [`UserProgress`] is the single unit of mutable state the engine operates
//! on: level, streak, ledger, unlocked achievements, the idempotency
//! seen-set, and instruction progress records. One aggregate belongs to one
//! user and is mutated only through
//! [`Questline::add_experience`](crate::Questline::add_experience) (and the
//! host's [`record_instruction`](UserProgress::record_instruction) calls as
//! grading advances).

pub mod types;

pub use types::{InstructionProgress, InstructionStatus, UserProgress};
