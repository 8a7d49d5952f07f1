// src/core/split/journal.rs

//! The append-only journal of completed split sub-steps, and the pure
//! function mapping each entry to its rollback-table inverse (spec.md
//! §4.G). A journal entry is appended *before* its step executes, so a
//! crash mid-step still leaves a record of what to unwind.

/// Which daughter a `STARTED_REGION_*` entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daughter {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEntry {
    CreateSplitDir,
    ClosedParent,
    OfflinedParent,
    StartedRegion(Daughter),
}

pub type Journal = Vec<JournalEntry>;

/// The inverse action for one journal entry, per spec.md §4.G's rollback
/// table. Pure: given an entry, always yields the same action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseAction {
    DeleteDaughterDir(Daughter),
    ReAddParentOnline,
    ReopenParentLocally,
    DeleteSplitDir,
}

pub fn inverse_step(entry: JournalEntry) -> InverseAction {
    match entry {
        JournalEntry::StartedRegion(d) => InverseAction::DeleteDaughterDir(d),
        JournalEntry::OfflinedParent => InverseAction::ReAddParentOnline,
        JournalEntry::ClosedParent => InverseAction::ReopenParentLocally,
        JournalEntry::CreateSplitDir => InverseAction::DeleteSplitDir,
    }
}
