// src/core/rpc/simulated.rs

//! `SimulatedRegionServer`: drives the RegionServer-side CAS rules of
//! spec.md §4.F against a shared `CoordStore`/`Catalog`, and the Split
//! Transaction of §4.G. Plays the Master's view of a fleet of RegionServer
//! peers for tests and the demo binary, grounded on
//! `warden::client::WardenClient`'s "this process's view of a peer
//! instance" role.

use super::trait_def::RegionServerRpc;
use crate::core::catalog::Catalog;
use crate::core::coordstore::CoordStore;
use crate::core::errors::AssignError;
use crate::core::paths;
use crate::core::region::{Region, RegionState, RegionStateNode, ServerName};
use crate::core::split::{InMemoryRegionFileOps, SplitTransaction};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

fn encode(node: &RegionStateNode) -> Bytes {
    Bytes::from(serde_json::to_vec(node).expect("RegionStateNode serializes"))
}

fn decode(data: &[u8]) -> Result<RegionStateNode, AssignError> {
    serde_json::from_slice(data).map_err(|e| AssignError::Internal(format!("corrupt region node: {e}")))
}

pub struct SimulatedRegionServer {
    coord: Arc<dyn CoordStore>,
    catalog: Arc<dyn Catalog>,
    file_ops: InMemoryRegionFileOps,
    /// Each server's locally-loaded regions (the RS-local online-regions
    /// map referenced by spec.md §5).
    online: DashMap<ServerName, HashSet<String>>,
}

impl SimulatedRegionServer {
    pub fn new(coord: Arc<dyn CoordStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            coord,
            catalog,
            file_ops: InMemoryRegionFileOps::new(),
            online: DashMap::new(),
        }
    }

    /// Seeds `region` as already hosted locally by `server`, with the given
    /// store files, for split-transaction tests/demo scenarios.
    pub fn seed_region(&self, region: &Region, server: &ServerName, store_files: Vec<String>) {
        self.file_ops.seed(region, store_files);
        self.online.entry(server.clone()).or_default().insert(region.encoded_name());
    }

    pub fn is_online(&self, server: &ServerName, region: &Region) -> bool {
        self.online
            .get(server)
            .map(|set| set.contains(&region.encoded_name()))
            .unwrap_or(false)
    }

    fn now_millis() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is after the epoch")
            .as_millis() as i64
    }
}

#[async_trait]
impl RegionServerRpc for SimulatedRegionServer {
    async fn open_region(&self, region: &Region, target: &ServerName) -> Result<(), AssignError> {
        if self.is_online(target, region) {
            return Ok(());
        }

        let path = paths::unassigned(&region.encoded_name());
        let (data, version) = self.coord.get(&path).await?;
        let node = decode(&data)?;
        if node.state != RegionState::Offline || node.owning_server != *target {
            return Err(AssignError::InvalidTransition {
                region: region.encoded_name(),
                from: node.state.to_string(),
                attempted: RegionState::Opening.to_string(),
            });
        }

        let opening = RegionStateNode {
            region_name: region.encoded_name(),
            state: RegionState::Opening,
            owning_server: target.clone(),
            timestamp_millis: Self::now_millis(),
        };
        let version = self.coord.set_data(&path, encode(&opening), version).await?;

        // Local open completes, then postOpenDeployTasks: catalog update
        // happens before the CAS to OPENED (spec.md §4.F).
        self.catalog.update_region_location(region, target).await?;

        let opened = RegionStateNode {
            region_name: region.encoded_name(),
            state: RegionState::Opened,
            owning_server: target.clone(),
            timestamp_millis: Self::now_millis(),
        };
        self.coord.set_data(&path, encode(&opened), version).await?;

        self.online.entry(target.clone()).or_default().insert(region.encoded_name());
        Ok(())
    }

    async fn close_region(&self, region: &Region, target: &ServerName) -> Result<(), AssignError> {
        if !self.is_online(target, region) {
            return Ok(());
        }

        let path = paths::unassigned(&region.encoded_name());
        let (data, version) = self.coord.get(&path).await?;
        let node = decode(&data)?;
        if node.state != RegionState::Closing || node.owning_server != *target {
            return Err(AssignError::InvalidTransition {
                region: region.encoded_name(),
                from: node.state.to_string(),
                attempted: RegionState::Closed.to_string(),
            });
        }

        if let Some(mut set) = self.online.get_mut(target) {
            set.remove(&region.encoded_name());
        }

        let closed = RegionStateNode {
            region_name: region.encoded_name(),
            state: RegionState::Closed,
            owning_server: target.clone(),
            timestamp_millis: Self::now_millis(),
        };
        self.coord.set_data(&path, encode(&closed), version).await?;
        Ok(())
    }

    async fn split_region(
        &self,
        region: &Region,
        target: &ServerName,
        split_row: Option<Bytes>,
    ) -> Result<(), AssignError> {
        let split_row = split_row.ok_or_else(|| {
            AssignError::InvalidSplitRow("RegionServer-chosen split row is not implemented in the simulator".into())
        })?;

        let (mut txn, daughter_a, daughter_b) = SplitTransaction::prepare(region, split_row, Self::now_millis())?;
        txn.execute(region, &daughter_a, &daughter_b, target, &self.file_ops, self.catalog.as_ref())
            .await?;

        if let Some(mut set) = self.online.get_mut(target) {
            set.remove(&region.encoded_name());
            set.insert(daughter_a.encoded_name());
            set.insert(daughter_b.encoded_name());
        }
        Ok(())
    }
}
