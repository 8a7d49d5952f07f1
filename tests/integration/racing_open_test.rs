// tests/integration/racing_open_test.rs

use region_assign::core::catalog::{Catalog, InMemoryCatalog};
use region_assign::core::coordstore::{CoordStore, LocalCoordStore};
use region_assign::core::paths;
use region_assign::core::region::{Region, RegionState, RegionStateNode, ServerName};
use region_assign::core::rpc::{RegionServerRpc, SimulatedRegionServer};
use bytes::Bytes;
use std::sync::Arc;

fn server() -> ServerName {
    ServerName::new("10.0.0.1", 60040, 1)
}

/// Two RegionServers racing a retried `openRegion` RPC for the same region:
/// exactly one wins the CAS, the other aborts, and the catalog records a
/// single owner.
#[tokio::test]
async fn racing_open_region_has_exactly_one_winner_and_one_catalog_owner() {
    let coord = Arc::new(LocalCoordStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let region = Region::first("orders", 1);
    let target = server();

    let node = RegionStateNode {
        region_name: region.encoded_name(),
        state: RegionState::Offline,
        owning_server: target.clone(),
        timestamp_millis: 0,
    };
    coord
        .create(
            &paths::unassigned(&region.encoded_name()),
            Bytes::from(serde_json::to_vec(&node).unwrap()),
            None,
        )
        .await
        .unwrap();

    let rs_a = SimulatedRegionServer::new(coord.clone(), catalog.clone());
    let rs_b = SimulatedRegionServer::new(coord.clone(), catalog.clone());

    let (a, b) = tokio::join!(rs_a.open_region(&region, &target), rs_b.open_region(&region, &target));
    assert!(a.is_ok() ^ b.is_ok(), "exactly one of the racing opens should win");

    assert_eq!(catalog.location_of(&region).await.unwrap(), Some(target.clone()));
    assert!(rs_a.is_online(&target, &region) ^ rs_b.is_online(&target, &region));
}
