// src/core/dispatcher/mod.rs

//! The Event Dispatcher (spec.md §4.E): a single logical consumer that
//! serializes every assignment-state mutation. Grounded on
//! `warden::worker::MasterMonitor::run`'s cooperating-loop shape and
//! `server::spawner`'s task-spawning conventions.

use crate::core::region::ServerName;
use tokio::sync::mpsc;

/// Unifies coord-store watch events, RegionServer failure notifications,
/// and timer ticks into the one stream the dispatcher consumes, matching
/// spec.md §5's single-writer requirement.
#[derive(Debug, Clone)]
pub enum Event {
    /// A watched `/unassigned/<region>` node fired: created, data changed,
    /// or deleted.
    RegionNodeChanged { region_name: String },
    /// A `/rs/<server>` ephemeral node vanished.
    ServerDown { server: ServerName },
    /// Periodic tick driving balancer invocation and timeout scanning.
    Tick,
    /// Administrative request, converted here into assign/unassign calls.
    EnableTable { table: String },
    DisableTable { table: String },
}

/// A bounded channel plus the sending half handed out to producers
/// (coord-store watch tasks, the failure detector, the tick timer). The
/// receiving half is owned by whatever drives the dispatch loop
/// (`assignment::AssignmentManager::run_dispatcher`).
pub struct Dispatcher {
    pub sender: mpsc::Sender<Event>,
    pub receiver: mpsc::Receiver<Event>,
}

impl Dispatcher {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self { sender, receiver }
    }
}
