// src/core/assignment/dispatch.rs

//! The Event Dispatcher's consume loop (spec.md §5): a single logical
//! consumer draining `Event`s, fanning work for distinct regions out onto a
//! bounded `tokio::task::JoinSet`, grounded on `warden::mod::run`'s JoinSet
//! use and the dispatcher/tick-timer split described in spec.md §4.I.

use super::manager::AssignmentManager;
use crate::core::dispatcher::Event;
use crate::core::metrics;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Maximum number of in-flight per-region handlers. Distinct regions process
/// concurrently; the coord-store's CAS semantics (not this bound) are what
/// actually keep a single region's transitions serialized.
const MAX_CONCURRENT_HANDLERS: usize = 64;

impl AssignmentManager {
    /// Drains `receiver` until the channel closes, dispatching each event to
    /// the matching handler. Runs until the sending half (held by watch
    /// tasks, the failure detector, and the tick timer) is dropped.
    pub async fn run_dispatcher(self: Arc<Self>, mut receiver: mpsc::Receiver<Event>) {
        let mut handlers: JoinSet<()> = JoinSet::new();

        loop {
            while handlers.len() >= MAX_CONCURRENT_HANDLERS {
                handlers.join_next().await;
            }

            tokio::select! {
                event = receiver.recv() => {
                    let Some(event) = event else { break };
                    let manager = self.clone();
                    handlers.spawn(async move {
                        manager.handle_event(event).await;
                    });
                }
                Some(result) = handlers.join_next(), if !handlers.is_empty() => {
                    if let Err(e) = result {
                        error!(error = %e, "dispatcher handler task panicked");
                    }
                }
            }
        }

        while handlers.join_next().await.is_some() {}
    }

    async fn handle_event(&self, event: Event) {
        metrics::set_regions_in_transition(self.store.in_transition_count());
        let result = match event {
            Event::RegionNodeChanged { region_name } => self.on_region_node_event(&region_name).await,
            Event::ServerDown { server } => self.handle_server_down(server).await,
            Event::Tick => {
                self.scan_timeouts().await;
                Ok(())
            }
            Event::EnableTable { table } => self.enable_table(&table).await,
            Event::DisableTable { table } => self.disable_table(&table).await,
        };
        if let Err(e) = result {
            warn!(error = %e, "dispatcher event handling failed");
        }
    }
}
