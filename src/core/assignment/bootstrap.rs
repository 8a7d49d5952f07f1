// src/core/assignment/bootstrap.rs

//! Initial-assignment / cluster-start sequence (spec.md §4.F "Initial
//! assignment (cluster start)").

use super::manager::AssignmentManager;
use crate::core::errors::AssignError;
use crate::core::paths;
use crate::core::region::Region;
use std::time::Duration;
use tracing::info;

impl AssignmentManager {
    /// "Fresh start" is detected by the absence of both live RegionServer
    /// ephemeral nodes and any prior `/unassigned` children.
    pub async fn detect_fresh_start(&self) -> Result<bool, AssignError> {
        let rs_children = self.coord.list(paths::RS_ROOT).await?;
        let unassigned_children = self.coord.list(paths::UNASSIGNED_ROOT).await?;
        Ok(rs_children.is_empty() && unassigned_children.is_empty())
    }

    /// Waits for `min_servers_to_start` live servers, or gives up
    /// `fresh_start_timeout` after the first one appears.
    pub async fn wait_for_min_servers(&self) -> Result<(), AssignError> {
        let mut first_seen: Option<tokio::time::Instant> = None;
        loop {
            let count = self.live_server_count();
            if count >= self.config.min_servers_to_start {
                return Ok(());
            }
            if count > 0 {
                let first = first_seen.get_or_insert_with(tokio::time::Instant::now);
                if first.elapsed() >= self.config.fresh_start_timeout {
                    info!(count, "fresh-start timeout elapsed; proceeding with available servers");
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Polls the region store until `region` is recorded open somewhere,
    /// bounded by twice the opening timeout. Bootstrap runs before the Event
    /// Dispatcher starts consuming watch events, so this drives the
    /// observed-state handling itself rather than waiting for a watcher.
    pub async fn wait_until_open(&self, region: &Region) -> Result<(), AssignError> {
        let deadline = tokio::time::Instant::now() + self.config.opening_timeout * 2;
        while tokio::time::Instant::now() < deadline {
            if self.store.server_of_region(&region.encoded_name()).is_some() {
                return Ok(());
            }
            self.on_region_node_event(&region.encoded_name()).await?;
            if self.store.server_of_region(&region.encoded_name()).is_some() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        Err(AssignError::Internal(format!(
            "{} did not open before the bootstrap deadline",
            region.encoded_name()
        )))
    }

    /// Runs the full bootstrap sequence: delete unassigned detritus on a
    /// fresh start, wait for the server quorum, open root then meta, then
    /// bulk-assign every user region.
    pub async fn initial_bulk_assign(
        &self,
        root: Region,
        meta: Region,
        user_regions: Vec<Region>,
    ) -> Result<(), AssignError> {
        if self.detect_fresh_start().await? {
            self.coord.delete_children(paths::UNASSIGNED_ROOT).await?;
        }
        self.wait_for_min_servers().await?;

        let root_dest = self
            .pick_destination(None)
            .ok_or_else(|| AssignError::Internal("no live RegionServers to bootstrap onto".into()))?;
        self.assign(&root, root_dest.clone()).await?;
        self.wait_until_open(&root).await?;
        info!(server = %root_dest, "root region opened");

        let meta_dest = self.pick_destination(None).unwrap_or(root_dest);
        self.assign(&meta, meta_dest.clone()).await?;
        self.wait_until_open(&meta).await?;
        info!(server = %meta_dest, "meta region opened");

        for region in user_regions {
            let destination = self
                .pick_destination(None)
                .ok_or_else(|| AssignError::Internal("no live RegionServers to bootstrap onto".into()))?;
            self.assign(&region, destination).await?;
            self.wait_until_open(&region).await?;
        }
        Ok(())
    }
}
