// src/core/region/store.rs

//! The Master's view of region state and plans: `regionsInTransition`,
//! `plans`, and `serverRegions` from spec.md §4.B, all behind one
//! manager-wide lock so that reconciliation queries (e.g. "is this region
//! either in transition or open somewhere") never observe a torn snapshot.

use super::descriptor::ServerName;
use super::plan::RegionPlan;
use super::state::{RegionState, RegionTransition};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct Inner {
    regions_in_transition: HashMap<String, RegionTransition>,
    plans: HashMap<String, RegionPlan>,
    server_regions: HashMap<ServerName, HashSet<String>>,
}

/// In-memory region/plan/placement bookkeeping, protected by a single lock
/// per spec.md §4.B's invariant: "`regionsInTransition` matches the set of
/// live coord-store state nodes after reconciliation."
#[derive(Debug, Default)]
pub struct RegionStateStore {
    inner: Mutex<Inner>,
}

impl RegionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_transition(
        &self,
        region_name: impl Into<String>,
        state: RegionState,
        server: ServerName,
        version: u64,
    ) {
        let mut inner = self.inner.lock();
        inner
            .regions_in_transition
            .insert(region_name.into(), RegionTransition::new(state, server, version));
    }

    pub fn update_transition(
        &self,
        region_name: &str,
        state: RegionState,
        server: ServerName,
        version: u64,
    ) {
        let mut inner = self.inner.lock();
        if let Some(t) = inner.regions_in_transition.get_mut(region_name) {
            t.touch(state, server, version);
        }
    }

    pub fn transition(&self, region_name: &str) -> Option<RegionTransition> {
        self.inner.lock().regions_in_transition.get(region_name).cloned()
    }

    pub fn remove_transition(&self, region_name: &str) -> Option<RegionTransition> {
        self.inner.lock().regions_in_transition.remove(region_name)
    }

    pub fn is_in_transition(&self, region_name: &str) -> bool {
        self.inner.lock().regions_in_transition.contains_key(region_name)
    }

    /// Region names whose transition deadline (`last_update + timeout`) has
    /// passed, for the given per-state timeout lookup.
    pub fn timed_out_regions(
        &self,
        timeout_for: impl Fn(RegionState) -> std::time::Duration,
    ) -> Vec<String> {
        let inner = self.inner.lock();
        inner
            .regions_in_transition
            .iter()
            .filter(|(_, t)| t.last_update.elapsed() > timeout_for(t.state))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn set_plan(&self, plan: RegionPlan) {
        self.inner
            .lock()
            .plans
            .insert(plan.region_name.clone(), plan);
    }

    pub fn plan(&self, region_name: &str) -> Option<RegionPlan> {
        self.inner.lock().plans.get(region_name).cloned()
    }

    pub fn remove_plan(&self, region_name: &str) -> Option<RegionPlan> {
        self.inner.lock().plans.remove(region_name)
    }

    /// Marks `region_name` as open on `server`, removing it from whatever
    /// server it was previously recorded open on (a region is open on at
    /// most one server at any instant, per the assignment-safety invariant).
    pub fn mark_open(&self, region_name: &str, server: ServerName) {
        let mut inner = self.inner.lock();
        for regions in inner.server_regions.values_mut() {
            regions.remove(region_name);
        }
        inner
            .server_regions
            .entry(server)
            .or_default()
            .insert(region_name.to_string());
    }

    pub fn mark_closed(&self, region_name: &str, server: &ServerName) {
        let mut inner = self.inner.lock();
        if let Some(regions) = inner.server_regions.get_mut(server) {
            regions.remove(region_name);
        }
    }

    pub fn regions_on_server(&self, server: &ServerName) -> Vec<String> {
        self.inner
            .lock()
            .server_regions
            .get(server)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops all bookkeeping for `server` (used when a server is declared
    /// dead) and returns the regions that were believed open there.
    pub fn take_server_regions(&self, server: &ServerName) -> Vec<String> {
        self.inner
            .lock()
            .server_regions
            .remove(server)
            .map(|s| s.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn server_of_region(&self, region_name: &str) -> Option<ServerName> {
        let inner = self.inner.lock();
        inner
            .server_regions
            .iter()
            .find(|(_, regions)| regions.contains(region_name))
            .map(|(server, _)| server.clone())
    }

    pub fn in_transition_count(&self) -> usize {
        self.inner.lock().regions_in_transition.len()
    }

    pub fn transitioning_region_names(&self) -> Vec<String> {
        self.inner.lock().regions_in_transition.keys().cloned().collect()
    }
}
