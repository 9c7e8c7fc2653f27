//! Error types for questline.
//!
//! Questline uses a hierarchical error system:
//! - `QuestlineError` is the top-level error returned by all public APIs
//! - Specific error types (`ValidationError`, `NotFoundError`) provide detail
//!
//! Note that an idempotency hit (re-submitting an already-rewarded lesson or
//! instruction) is NOT an error: the grant path returns a zero-gain
//! [`GrantOutcome`](crate::GrantOutcome) instead. Errors are reserved for
//! conditions where no state was or could be mutated.

use thiserror::Error;

use crate::types::{InstructionId, ProgramId, UserId};

/// Result type alias for questline operations.
pub type Result<T> = std::result::Result<T, QuestlineError>;

/// Top-level error enum for all questline operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum QuestlineError {
    /// Input or tuning validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Tuning configuration error.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of what's wrong with the configuration.
        reason: String,
    },

    /// Requested entity not found.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),
}

impl QuestlineError {
    /// Creates a configuration error with the given reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Validation errors for caller-provided data and tuning tables.
///
/// These errors indicate problems with data provided by the caller. They are
/// always raised before any aggregate state is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// Name of the missing field.
        field: String,
    },

    /// A tuning table that must be non-empty is empty.
    #[error("Empty tuning table: {table}")]
    EmptyTable {
        /// Name of the offending table.
        table: String,
    },

    /// An instruction grant was requested before the instruction was graded.
    #[error("Instruction {instruction_id} in program {program_id} is not graded")]
    NotGraded {
        /// Program the instruction belongs to.
        program_id: ProgramId,
        /// The ungraded instruction.
        instruction_id: InstructionId,
    },
}

impl ValidationError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a required field error.
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    /// Creates an empty table error.
    pub fn empty_table(table: impl Into<String>) -> Self {
        Self::EmptyTable {
            table: table.into(),
        }
    }

    /// Creates a not-graded error.
    pub fn not_graded(program_id: ProgramId, instruction_id: InstructionId) -> Self {
        Self::NotGraded {
            program_id,
            instruction_id,
        }
    }
}

/// Not found errors for specific entity types.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// No progression aggregate exists for the given user.
    #[error("Profile not found: {0}")]
    Profile(UserId),

    /// No instruction progress record exists for the given key.
    #[error("Instruction not found: {instruction_id} in program {program_id}")]
    Instruction {
        /// Program the instruction was looked up in.
        program_id: ProgramId,
        /// The missing instruction.
        instruction_id: InstructionId,
    },
}

impl NotFoundError {
    /// Creates a profile not found error.
    pub fn profile(user: impl Into<UserId>) -> Self {
        Self::Profile(user.into())
    }

    /// Creates an instruction not found error.
    pub fn instruction(program_id: ProgramId, instruction_id: InstructionId) -> Self {
        Self::Instruction {
            program_id,
            instruction_id,
        }
    }
}
