// src/core/assignment/failover.rs

//! Master-failover reconciliation (spec.md §4.F "Master failover"): before
//! enabling new event handling, read every child of `.../unassigned` and
//! act per the takeover table.

use super::manager::{decode, AssignmentManager};
use crate::core::errors::AssignError;
use crate::core::paths;
use crate::core::region::RegionState;
use tracing::{info, warn};

impl AssignmentManager {
    /// Reconciles every in-flight region transition observed at Master
    /// takeover. Must run to completion before the Event Dispatcher starts
    /// consuming new events.
    pub async fn recover_from_master_failover(&self) -> Result<(), AssignError> {
        let children = self.coord.list(paths::UNASSIGNED_ROOT).await?;
        for region_name in children {
            let Some(region) = self.region_by_name(&region_name) else {
                warn!(region = %region_name, "unassigned node for unregistered region at takeover; skipping");
                continue;
            };
            let path = paths::unassigned(&region_name);
            let (data, version) = match self.coord.get(&path).await {
                Ok(v) => v,
                Err(AssignError::NodeNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let node = decode(&data)?;

            match node.state {
                RegionState::Offline | RegionState::Closed => {
                    info!(region = %region_name, state = %node.state, "re-planning after takeover");
                    self.assign(&region, node.owning_server).await?;
                }
                RegionState::Closing | RegionState::Opening => {
                    info!(region = %region_name, state = %node.state, "leaving in-flight transition for the timeout handler");
                    self.store
                        .start_transition(region_name.clone(), node.state, node.owning_server, version);
                }
                RegionState::Opened => {
                    self.catalog.update_region_location(&region, &node.owning_server).await?;
                    self.coord.delete(&path, version).await?;
                    self.store.mark_open(&region_name, node.owning_server);
                }
            }
        }
        Ok(())
    }
}
