// tests/integration/master_failover_test.rs

use region_assign::core::assignment::manager::AssignmentConfig;
use region_assign::core::assignment::AssignmentManager;
use region_assign::core::catalog::{Catalog, InMemoryCatalog};
use region_assign::core::coordstore::LocalCoordStore;
use region_assign::core::errors::AssignError;
use region_assign::core::region::{Region, RegionPlan, ServerName};
use region_assign::core::rpc::{RegionServerRpc, SimulatedRegionServer};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// A RegionServer that accepts `closeRegion` but never resolves the node to
/// `CLOSED`, standing in for a Master that dies between sending the close
/// RPC and observing its completion.
struct StallCloseRpc {
    inner: Arc<SimulatedRegionServer>,
}

#[async_trait]
impl RegionServerRpc for StallCloseRpc {
    async fn open_region(&self, region: &Region, target: &ServerName) -> Result<(), AssignError> {
        self.inner.open_region(region, target).await
    }

    async fn close_region(&self, _region: &Region, _target: &ServerName) -> Result<(), AssignError> {
        Ok(())
    }

    async fn split_region(
        &self,
        region: &Region,
        target: &ServerName,
        split_row: Option<Bytes>,
    ) -> Result<(), AssignError> {
        self.inner.split_region(region, target, split_row).await
    }
}

fn config() -> AssignmentConfig {
    AssignmentConfig {
        opening_timeout: Duration::from_millis(150),
        closing_timeout: Duration::from_millis(80),
        offline_timeout: Duration::from_millis(80),
        min_servers_to_start: 1,
        fresh_start_timeout: Duration::from_millis(50),
    }
}

/// A balance move stalls in `CLOSING` (the old Master died before it
/// resolved). The successor's timeout scan finds the stuck transition,
/// forces it forward, and completes the assignment per the original plan.
#[tokio::test]
async fn timeout_scan_completes_a_stuck_closing_transition() {
    let coord = Arc::new(LocalCoordStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let inner_rpc = Arc::new(SimulatedRegionServer::new(coord.clone(), catalog.clone()));
    let rpc = Arc::new(StallCloseRpc { inner: inner_rpc });
    let manager = AssignmentManager::new(coord, catalog.clone(), rpc, config());

    let s0 = ServerName::new("10.0.0.1", 1, 1);
    let s1 = ServerName::new("10.0.0.1", 2, 1);
    manager.mark_server_live(s0.clone());

    let region = Region::first("orders", 100);
    manager.assign(&region, s0.clone()).await.unwrap();
    manager.wait_until_open(&region).await.unwrap();
    assert_eq!(catalog.location_of(&region).await.unwrap(), Some(s0.clone()));

    manager.mark_server_live(s1.clone());
    manager
        .unassign(&region, RegionPlan::r#move(region.encoded_name(), s0.clone(), s1.clone()))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    manager.scan_timeouts().await;
    manager.wait_until_open(&region).await.unwrap();

    assert_eq!(catalog.location_of(&region).await.unwrap(), Some(s1));
}
