// src/core/coordstore/node.rs

//! Shared value types for the coord-store boundary.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies the client session that created an ephemeral node. Losing a
/// session (simulated via `LocalCoordStore::expire_session`) deletes every
/// ephemeral node it owns and fires `SessionExpired` to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    /// Allocates a fresh, process-unique session id.
    pub fn fresh() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

/// What fired on a registered watch. Each watch delivers at most one event,
/// matching spec.md §4.A's "at most one event per registration" contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Created,
    DataChanged,
    Deleted,
    ChildrenChanged,
    /// The session backing this watch's registrant was lost; the watch
    /// resolves immediately instead of waiting for a node event.
    SessionExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NodeKind {
    Persistent,
    Ephemeral(SessionId),
}

#[derive(Debug, Clone)]
pub(super) struct StoredNode {
    pub data: bytes::Bytes,
    pub version: u64,
    pub kind: NodeKind,
}
