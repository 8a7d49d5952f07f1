// tests/integration/fresh_cluster_test.rs

use super::test_helpers::{server, AssignTestContext};
use region_assign::core::catalog::Catalog;
use region_assign::core::region::{Region, META_TABLE, ROOT_TABLE};

/// Fresh cluster, 3 servers, 9 user regions: every server ends up with a
/// fair share of regions and `.META.` reports every one of them.
#[tokio::test]
async fn fresh_cluster_spreads_regions_evenly_and_populates_the_catalog() {
    let servers: Vec<_> = (0..3).map(server).collect();
    let ctx = AssignTestContext::with_live_servers(AssignTestContext::fast_config(), &servers);

    let root = Region::first(ROOT_TABLE, 1);
    let meta = Region::first(META_TABLE, 2);
    let user_regions: Vec<Region> = (0..9).map(|i| Region::first("orders", 100 + i)).collect();

    ctx.manager
        .initial_bulk_assign(root.clone(), meta.clone(), user_regions.clone())
        .await
        .unwrap();

    for region in user_regions.iter().chain([&root, &meta]) {
        assert!(
            ctx.catalog.location_of(region).await.unwrap().is_some(),
            "{} should be recorded open somewhere",
            region.encoded_name()
        );
    }

    // 11 total regions over 3 servers: counts differ by at most one.
    let mut counts = vec![0usize; servers.len()];
    for region in user_regions.iter().chain([&root, &meta]) {
        let location = ctx.catalog.location_of(region).await.unwrap().unwrap();
        let idx = servers.iter().position(|s| *s == location).unwrap();
        counts[idx] += 1;
    }
    assert_eq!(counts.iter().sum::<usize>(), 11);
    assert!(*counts.iter().max().unwrap() - *counts.iter().min().unwrap() <= 1);
}
