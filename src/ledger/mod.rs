//! Capped, append-only XP ledger.
//!
//! Every grant appends here: the base lesson/instruction entry, a separate
//! streak bonus entry when one was earned, and one entry per achievement
//! unlock. The most recent [`LEDGER_CAP`] entries are retained; trimming
//! drops the oldest first.

pub mod types;

pub use types::{LedgerEntry, LedgerEntryKind};

use chrono::{DateTime, Utc};

use crate::types::EntryId;

/// Maximum retained ledger entries per user.
pub const LEDGER_CAP: usize = 1000;

/// Appends an entry and returns its ID.
///
/// Trimming is a separate step ([`trim`]) so one grant's entries (base +
/// streak bonus + unlocks) land atomically before the cap is enforced.
pub fn append(
    ledger: &mut Vec<LedgerEntry>,
    kind: LedgerEntryKind,
    xp: u32,
    timestamp: DateTime<Utc>,
) -> EntryId {
    let entry = LedgerEntry::new(kind, xp, timestamp);
    let id = entry.id;
    ledger.push(entry);
    id
}

/// Drops the oldest entries until the ledger fits [`LEDGER_CAP`].
pub fn trim(ledger: &mut Vec<LedgerEntry>) {
    if ledger.len() > LEDGER_CAP {
        let excess = ledger.len() - LEDGER_CAP;
        ledger.drain(..excess);
    }
}
