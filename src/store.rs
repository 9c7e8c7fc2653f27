//! In-memory profile store with per-user write serialization.
//!
//! The engine assumes a single writer per aggregate within one call, but two
//! callers racing on the same user through an external load-mutate-store
//! cycle can silently drop or duplicate XP. Hosts with a real persistence
//! layer must answer that with their own per-user mutex or optimistic
//! versioned writes; [`ProfileStore`] is the in-process answer for
//! embedders (tests, single-node services, simulations) that keep
//! aggregates in memory.
//!
//! One `Arc<Mutex<UserProgress>>` per user: concurrent grants for the same
//! user queue on the user's mutex while distinct users proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::engine::{GrantOutcome, Questline, XpEvent};
use crate::error::{NotFoundError, Result};
use crate::profile::UserProgress;
use crate::types::UserId;

/// Thread-safe, in-memory store of progression aggregates.
///
/// Owns a [`Questline`] engine and routes every grant through the target
/// user's own mutex. `ProfileStore` is `Send + Sync`; share it with `Arc`.
#[derive(Debug)]
pub struct ProfileStore {
    engine: Questline,
    profiles: RwLock<HashMap<UserId, Arc<Mutex<UserProgress>>>>,
}

impl ProfileStore {
    /// Creates an empty store around an engine.
    pub fn new(engine: Questline) -> Self {
        Self {
            engine,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// The engine this store grants through.
    #[inline]
    pub fn engine(&self) -> &Questline {
        &self.engine
    }

    /// Returns the user's aggregate, materializing a fresh one on first use.
    pub fn open_or_create(&self, user_id: &UserId) -> Arc<Mutex<UserProgress>> {
        if let Some(profile) = read_map(&self.profiles).get(user_id) {
            return Arc::clone(profile);
        }

        let mut map = write_map(&self.profiles);
        // Re-check under the write lock: another thread may have won the race
        Arc::clone(map.entry(user_id.clone()).or_insert_with(|| {
            info!(user = %user_id, "materializing progression aggregate");
            Arc::new(Mutex::new(self.engine.new_profile(user_id.clone())))
        }))
    }

    /// Returns the user's aggregate, or `NotFound` if never materialized.
    pub fn get(&self, user_id: &UserId) -> Result<Arc<Mutex<UserProgress>>> {
        read_map(&self.profiles)
            .get(user_id)
            .map(Arc::clone)
            .ok_or_else(|| NotFoundError::Profile(user_id.clone()).into())
    }

    /// Grants an event to an existing user, serialized on the user's mutex.
    ///
    /// # Errors
    /// `NotFound` when the user was never materialized (grants never
    /// implicitly create aggregates — that is an explicit host decision via
    /// [`open_or_create`](Self::open_or_create)), plus any engine error.
    pub fn add_experience(&self, user_id: &UserId, event: &XpEvent) -> Result<GrantOutcome> {
        let profile = self.get(user_id)?;
        let mut guard = lock_profile(&profile);
        self.engine.add_experience(&mut guard, event)
    }

    /// Runs a closure against the user's aggregate under its mutex.
    ///
    /// This is how hosts record instruction grading progress or read
    /// consistent snapshots:
    ///
    /// ```rust
    /// use questline::{ProfileStore, Questline, InstructionStatus, UserId};
    ///
    /// let store = ProfileStore::new(Questline::with_defaults());
    /// let user = UserId::new("user-1");
    /// store.open_or_create(&user);
    /// store
    ///     .with_profile(&user, |profile| {
    ///         profile.record_instruction("rust-101", "instr-1", InstructionStatus::Graded);
    ///     })
    ///     .unwrap();
    /// ```
    pub fn with_profile<T>(
        &self,
        user_id: &UserId,
        f: impl FnOnce(&mut UserProgress) -> T,
    ) -> Result<T> {
        let profile = self.get(user_id)?;
        let mut guard = lock_profile(&profile);
        Ok(f(&mut guard))
    }

    /// Clones the user's aggregate for lock-free reading.
    pub fn snapshot(&self, user_id: &UserId) -> Result<UserProgress> {
        self.with_profile(user_id, |profile| profile.clone())
    }

    /// Number of materialized aggregates.
    pub fn len(&self) -> usize {
        read_map(&self.profiles).len()
    }

    /// Returns true if no aggregate has been materialized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A poisoned lock only means another thread panicked while holding it; the
// aggregate is still structurally valid state, so recover the guard instead
// of propagating a panic through every later caller.

fn lock_profile(profile: &Mutex<UserProgress>) -> MutexGuard<'_, UserProgress> {
    profile.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_map(
    map: &RwLock<HashMap<UserId, Arc<Mutex<UserProgress>>>>,
) -> RwLockReadGuard<'_, HashMap<UserId, Arc<Mutex<UserProgress>>>> {
    map.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_map(
    map: &RwLock<HashMap<UserId, Arc<Mutex<UserProgress>>>>,
) -> RwLockWriteGuard<'_, HashMap<UserId, Arc<Mutex<UserProgress>>>> {
    map.write().unwrap_or_else(PoisonError::into_inner)
}
