// tests/integration/server_failure_test.rs

use super::test_helpers::{server, AssignTestContext};
use region_assign::core::catalog::Catalog;
use region_assign::core::region::{Region, ServerName, META_TABLE, ROOT_TABLE};
use std::collections::HashMap;

/// Killing a server holding several regions reassigns every one of them to a
/// surviving server, and no region is ever recorded open in two places.
#[tokio::test]
async fn dead_server_regions_reopen_elsewhere() {
    let servers: Vec<_> = (0..3).map(server).collect();
    let ctx = AssignTestContext::with_live_servers(AssignTestContext::fast_config(), &servers);

    let root = Region::first(ROOT_TABLE, 1);
    let meta = Region::first(META_TABLE, 2);
    let user_regions: Vec<Region> = (0..6).map(|i| Region::first("orders", 100 + i)).collect();
    ctx.manager
        .initial_bulk_assign(root.clone(), meta.clone(), user_regions.clone())
        .await
        .unwrap();

    let all_regions: Vec<Region> = user_regions.iter().cloned().chain([root, meta]).collect();

    let mut owned: HashMap<ServerName, Vec<Region>> = HashMap::new();
    for region in &all_regions {
        let location = ctx.catalog.location_of(region).await.unwrap().unwrap();
        owned.entry(location).or_default().push(region.clone());
    }
    let (victim, owned_before) = owned.into_iter().max_by_key(|(_, regions)| regions.len()).unwrap();
    assert!(!owned_before.is_empty());

    ctx.manager.handle_server_down(victim.clone()).await.unwrap();

    for region in &owned_before {
        ctx.manager.wait_until_open(region).await.unwrap();
    }

    let survivors: Vec<_> = servers.iter().filter(|s| **s != victim).cloned().collect();
    for region in &owned_before {
        let location = ctx.catalog.location_of(region).await.unwrap().unwrap();
        assert!(survivors.contains(&location), "{} should have moved to a surviving server", region.encoded_name());
    }

    // No region is ever double-owned: every region's location is exactly
    // one server, and it's still one of the live ones.
    for region in &all_regions {
        let location = ctx.catalog.location_of(region).await.unwrap().unwrap();
        assert!(survivors.contains(&location));
    }
}
