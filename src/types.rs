//! Core type definitions for questline identifiers.
//!
//! Catalog-facing identifiers (users, programs, lessons, instructions,
//! achievements) are opaque strings supplied by the host application — the
//! engine never mints them. Ledger entries get their own UUID v7 identifier
//! so entries sort by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Creates a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Opaque user identifier.
    ///
    /// Questline doesn't handle authentication - the consumer provides user
    /// IDs. This allows integration with any auth system (OAuth, API keys,
    /// session tokens, etc.).
    UserId
}

string_id! {
    /// Program identifier from the static catalog.
    ///
    /// A program is a course of modules; lessons and practical instructions
    /// belong to exactly one program.
    ProgramId
}

string_id! {
    /// Lesson identifier from the static catalog.
    ///
    /// Lesson IDs are the idempotency key for `LessonCompleted` grants:
    /// each lesson rewards XP at most once per user.
    LessonId
}

string_id! {
    /// Practical instruction identifier from the static catalog.
    ///
    /// Together with its [`ProgramId`], an instruction ID forms the
    /// idempotency key for `InstructionGraded` grants.
    InstructionId
}

string_id! {
    /// Achievement identifier from the achievement definition set.
    AchievementId
}

/// Ledger entry identifier (UUID v7 for time-ordering).
///
/// Minted by the engine when an entry is appended; entries therefore sort
/// chronologically by ID as well as by timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Creates a new EntryId with a UUID v7 (time-ordered).
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a nil (all zeros) EntryId.
    /// Useful for testing or sentinel values.
    #[inline]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for EntryId {
    /// Returns a nil (all zeros) EntryId.
    ///
    /// For a new unique ID, use [`EntryId::new()`].
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
