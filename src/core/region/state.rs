// src/core/region/state.rs

//! The coord-store-observable region transition states and the in-memory
//! record of a single region's in-flight transition.

use super::descriptor::ServerName;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The state of a region node in the coord-store. A region has exactly one
/// such node iff it is in transition; absence of a node means the state is
/// "steady" (opened at the catalog-recorded server, or offline because the
/// table is disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionState {
    /// No server authoritative; the Master intends to assign.
    Offline,
    /// A specific server is in the process of taking ownership.
    Opening,
    /// That server has accepted ownership; catalog will be updated.
    Opened,
    /// The owning server is relinquishing ownership.
    Closing,
    /// Relinquishment complete; no server authoritative.
    Closed,
}

impl RegionState {
    /// Whether `next` is a legal successor of `self` per the state machine
    /// in spec.md §4.F (`OFFLINE -> OPENING -> OPENED` or `CLOSING -> CLOSED`).
    /// The Master itself may force any state back to `OFFLINE`; that
    /// privilege is modelled separately (`force_offline`), not here.
    pub fn can_transition_to(self, next: RegionState) -> bool {
        matches!(
            (self, next),
            (RegionState::Offline, RegionState::Opening)
                | (RegionState::Opening, RegionState::Opened)
                | (RegionState::Closing, RegionState::Closed)
        )
    }
}

impl std::fmt::Display for RegionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RegionState::Offline => "OFFLINE",
            RegionState::Opening => "OPENING",
            RegionState::Opened => "OPENED",
            RegionState::Closing => "CLOSING",
            RegionState::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// The coord-store node payload: `(regionName, state, owningServer, version)`.
/// `version` is maintained by the `CoordStore`, not carried in the data
/// itself, so this struct holds just the logical payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStateNode {
    pub region_name: String,
    pub state: RegionState,
    pub owning_server: ServerName,
    pub timestamp_millis: i64,
}

/// The Master's in-memory record of one region currently in transition.
/// Mirrors the coord-store node but adds bookkeeping (`last_update`) used
/// purely locally for timeout scanning.
#[derive(Debug, Clone)]
pub struct RegionTransition {
    pub state: RegionState,
    pub server: ServerName,
    pub start_time: Instant,
    pub last_update: Instant,
    /// The coord-store version last observed for this region's node.
    pub version: u64,
}

impl RegionTransition {
    pub fn new(state: RegionState, server: ServerName, version: u64) -> Self {
        let now = Instant::now();
        Self {
            state,
            server,
            start_time: now,
            last_update: now,
            version,
        }
    }

    pub fn touch(&mut self, state: RegionState, server: ServerName, version: u64) {
        self.state = state;
        self.server = server;
        self.version = version;
        self.last_update = Instant::now();
    }
}
