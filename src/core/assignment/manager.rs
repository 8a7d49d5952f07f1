// src/core/assignment/manager.rs

//! `AssignmentManager`: the single façade over the coord-store, catalog,
//! RPC client, and region bookkeeping. All mutation happens through this
//! struct's methods, called only from the Event Dispatcher loop (spec.md
//! §5's single-writer requirement) — it holds no lock of its own beyond
//! what `RegionStateStore` already provides.

use crate::core::catalog::Catalog;
use crate::core::coordstore::CoordStore;
use crate::core::errors::AssignError;
use crate::core::metrics;
use crate::core::paths;
use crate::core::region::{Region, RegionPlan, RegionState, RegionStateNode, RegionStateStore, ServerName};
use crate::core::rpc::RegionServerRpc;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Per-state transition timeouts and startup thresholds (spec.md §4.F).
/// Constructed from `config::MasterConfig`, kept separate so the pure
/// assignment logic doesn't depend on the config/TOML layer.
#[derive(Debug, Clone)]
pub struct AssignmentConfig {
    pub opening_timeout: Duration,
    pub closing_timeout: Duration,
    pub offline_timeout: Duration,
    pub min_servers_to_start: usize,
    pub fresh_start_timeout: Duration,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            opening_timeout: Duration::from_secs(30),
            closing_timeout: Duration::from_secs(30),
            offline_timeout: Duration::from_secs(10),
            min_servers_to_start: 1,
            fresh_start_timeout: Duration::from_secs(30),
        }
    }
}

pub struct AssignmentManager {
    pub(crate) coord: Arc<dyn CoordStore>,
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) rpc: Arc<dyn RegionServerRpc>,
    pub(crate) store: RegionStateStore,
    pub(crate) config: AssignmentConfig,
    /// Live RegionServers, mirroring `/rs/*` ephemeral children.
    pub(crate) live_servers: DashMap<ServerName, ()>,
    /// encoded region name -> descriptor, so event handlers that only carry
    /// a name (as observed off the coord-store path) can recover the full
    /// `Region`. Populated by bootstrap and by split/catalog scans.
    pub(crate) regions: DashMap<String, Region>,
}

pub(crate) fn encode(node: &RegionStateNode) -> Bytes {
    Bytes::from(serde_json::to_vec(node).expect("RegionStateNode serializes"))
}

pub(crate) fn decode(data: &[u8]) -> Result<RegionStateNode, AssignError> {
    serde_json::from_slice(data).map_err(|e| AssignError::Internal(format!("corrupt region node: {e}")))
}

pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_millis() as i64
}

impl AssignmentManager {
    pub fn new(
        coord: Arc<dyn CoordStore>,
        catalog: Arc<dyn Catalog>,
        rpc: Arc<dyn RegionServerRpc>,
        config: AssignmentConfig,
    ) -> Self {
        Self {
            coord,
            catalog,
            rpc,
            store: RegionStateStore::new(),
            config,
            live_servers: DashMap::new(),
            regions: DashMap::new(),
        }
    }

    pub fn register_region(&self, region: Region) {
        self.regions.insert(region.encoded_name(), region);
    }

    pub fn region_by_name(&self, region_name: &str) -> Option<Region> {
        self.regions.get(region_name).map(|r| r.clone())
    }

    pub fn mark_server_live(&self, server: ServerName) {
        self.live_servers.insert(server, ());
    }

    pub fn mark_server_dead(&self, server: &ServerName) {
        self.live_servers.remove(server);
    }

    pub fn live_server_count(&self) -> usize {
        self.live_servers.len()
    }

    pub fn live_servers(&self) -> Vec<ServerName> {
        self.live_servers.iter().map(|e| e.key().clone()).collect()
    }

    /// Picks the live server (other than `exclude`, if given) currently
    /// hosting the fewest regions, for re-assignment after a timeout or a
    /// server failure. Not the full balancer policy (no locality/stddev
    /// tie-breaks) — just enough to pick *somewhere* live.
    pub fn pick_destination(&self, exclude: Option<&ServerName>) -> Option<ServerName> {
        self.live_servers
            .iter()
            .map(|e| e.key().clone())
            .filter(|s| exclude != Some(s))
            .min_by_key(|s| self.store.regions_on_server(s).len())
    }

    /// Steady-state `assign(region, destination)` (spec.md §4.F).
    pub async fn assign(&self, region: &Region, destination: ServerName) -> Result<(), AssignError> {
        let node = RegionStateNode {
            region_name: region.encoded_name(),
            state: RegionState::Offline,
            owning_server: destination.clone(),
            timestamp_millis: now_millis(),
        };
        let version = self
            .coord
            .create_or_force(&paths::unassigned(&region.encoded_name()), encode(&node), None)
            .await?;

        self.store.set_plan(RegionPlan::assign(region.encoded_name(), destination.clone()));
        self.store
            .start_transition(region.encoded_name(), RegionState::Offline, destination.clone(), version);
        self.register_region(region.clone());
        metrics::inc_assign_total();

        if let Err(e) = self.rpc.open_region(region, &destination).await {
            warn!(region = %region.encoded_name(), error = %e, "open RPC not delivered; timeout scan will re-drive");
        }
        Ok(())
    }

    /// `unassign(region)`, triggered by a balance move or table disable.
    /// Writes the `CLOSING` node itself, symmetric with `assign`'s `OFFLINE`
    /// node, so a Master that dies mid-close leaves a transition a
    /// successor (or the timeout scan) can find and force forward.
    pub async fn unassign(&self, region: &Region, plan: RegionPlan) -> Result<(), AssignError> {
        let owner = self
            .store
            .server_of_region(&region.encoded_name())
            .ok_or_else(|| AssignError::Internal(format!("{} is not open anywhere", region.encoded_name())))?;

        let node = RegionStateNode {
            region_name: region.encoded_name(),
            state: RegionState::Closing,
            owning_server: owner.clone(),
            timestamp_millis: now_millis(),
        };
        let version = self
            .coord
            .create_or_force(&paths::unassigned(&region.encoded_name()), encode(&node), None)
            .await?;
        self.store
            .start_transition(region.encoded_name(), RegionState::Closing, owner.clone(), version);

        self.store.set_plan(plan);
        self.register_region(region.clone());
        metrics::inc_unassign_total();
        self.rpc.close_region(region, &owner).await
    }

    /// Handles a watch firing on `.../unassigned/<regionName>`.
    pub async fn on_region_node_event(&self, region_name: &str) -> Result<(), AssignError> {
        let Some(region) = self.region_by_name(region_name) else {
            warn!(region = %region_name, "event for unregistered region; ignoring");
            return Ok(());
        };
        let path = paths::unassigned(region_name);

        match self.coord.get(&path).await {
            Ok((data, version)) => self.handle_observed_state(&region, decode(&data)?, version).await,
            Err(AssignError::NodeNotFound(_)) => {
                self.store.remove_transition(region_name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn handle_observed_state(
        &self,
        region: &Region,
        node: RegionStateNode,
        version: u64,
    ) -> Result<(), AssignError> {
        let region_name = region.encoded_name();
        match node.state {
            RegionState::Offline | RegionState::Opening | RegionState::Closing => {
                self.store.update_transition(&region_name, node.state, node.owning_server, version);
                Ok(())
            }
            RegionState::Opened => {
                self.catalog.update_region_location(region, &node.owning_server).await?;
                self.coord.delete(&paths::unassigned(&region_name), version).await?;
                self.store.remove_transition(&region_name);
                self.store.mark_open(&region_name, node.owning_server);
                info!(region = %region_name, "region opened");
                Ok(())
            }
            RegionState::Closed => self.handle_closed(region, node, version).await,
        }
    }

    async fn handle_closed(&self, region: &Region, node: RegionStateNode, version: u64) -> Result<(), AssignError> {
        let region_name = region.encoded_name();
        let path = paths::unassigned(&region_name);
        self.store.mark_closed(&region_name, &node.owning_server);

        match self.store.plan(&region_name) {
            Some(plan) if plan.is_disable() => {
                self.coord.delete(&path, version).await?;
                self.store.remove_transition(&region_name);
                self.store.remove_plan(&region_name);
                Ok(())
            }
            Some(plan) => {
                let destination = plan
                    .destination
                    .clone()
                    .expect("a non-disable plan always carries a destination");
                self.store.remove_transition(&region_name);
                self.assign(region, destination).await
            }
            None => {
                self.coord.delete(&path, version).await?;
                self.store.remove_transition(&region_name);
                Ok(())
            }
        }
    }

    /// Periodic timeout scan (spec.md §4.F "Timeouts"): forces any
    /// transition past its deadline back to `OFFLINE` and re-assigns.
    pub async fn scan_timeouts(&self) {
        let config = &self.config;
        let timed_out = self.store.timed_out_regions(|state| match state {
            RegionState::Opening => config.opening_timeout,
            RegionState::Closing => config.closing_timeout,
            _ => config.offline_timeout,
        });

        for region_name in timed_out {
            let Some(region) = self.region_by_name(&region_name) else {
                continue;
            };
            let Some(transition) = self.store.transition(&region_name) else {
                continue;
            };
            warn!(region = %region_name, state = %transition.state, "transition timed out");
            let destination = self
                .pick_destination(Some(&transition.server))
                .unwrap_or(transition.server.clone());
            if let Err(e) = self.assign(&region, destination).await {
                warn!(region = %region_name, error = %e, "re-assign after timeout failed");
            }
        }
    }

    /// RegionServer-failure handling (spec.md §4.F table): reconciles every
    /// region the dead server owned or was transitioning.
    pub async fn handle_server_down(&self, server: ServerName) -> Result<(), AssignError> {
        self.mark_server_dead(&server);
        metrics::inc_server_down_total();

        for region_name in self.store.take_server_regions(&server) {
            if let Some(region) = self.region_by_name(&region_name) {
                let destination = self.pick_destination(Some(&server)).unwrap_or_else(|| server.clone());
                if let Err(e) = self.assign(&region, destination).await {
                    warn!(region = %region_name, error = %e, "re-assign after server failure failed");
                }
            }
        }

        for region_name in self.store.transitioning_region_names() {
            let Some(transition) = self.store.transition(&region_name) else {
                continue;
            };
            if transition.server != server {
                continue;
            }
            let Some(region) = self.region_by_name(&region_name) else {
                continue;
            };
            // Observed state | dead server is destination: force OFFLINE, re-plan.
            // (Dead-as-source CLOSED/OPENING/OPENED rows are no-ops: the normal
            // handler proceeds once the corresponding watch fires.)
            if matches!(transition.state, RegionState::Offline | RegionState::Closing) {
                let destination = self.pick_destination(Some(&server)).unwrap_or_else(|| server.clone());
                if let Err(e) = self.assign(&region, destination).await {
                    warn!(region = %region_name, error = %e, "re-assign after server failure failed");
                }
            }
        }
        Ok(())
    }

    /// Table enable: fabricate an `OFFLINE` node per region and assign.
    pub async fn enable_table(&self, table: &str) -> Result<(), AssignError> {
        let regions = self.catalog.get_regions_of_table(table).await?;
        for region in regions {
            let destination = self.pick_destination(None).ok_or_else(|| {
                AssignError::Internal("no live RegionServers to enable table onto".into())
            })?;
            self.assign(&region, destination).await?;
        }
        Ok(())
    }

    /// Table disable: set plans to `destination = None` then unassign each.
    pub async fn disable_table(&self, table: &str) -> Result<(), AssignError> {
        let regions = self.catalog.get_regions_of_table(table).await?;
        for region in regions {
            if let Some(owner) = self.store.server_of_region(&region.encoded_name()) {
                let plan = RegionPlan::disable(region.encoded_name(), owner);
                self.unassign(&region, plan).await?;
            }
        }
        Ok(())
    }
}
