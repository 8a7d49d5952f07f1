// tests/integration/split_test.rs

use region_assign::core::catalog::{Catalog, InMemoryCatalog};
use region_assign::core::region::{Region, ServerName};
use region_assign::core::split::{InMemoryRegionFileOps, RegionFileOps, SplitTransaction};
use bytes::Bytes;

fn server() -> ServerName {
    ServerName::new("10.0.0.1", 60030, 1)
}

/// Splitting a region with 2 store files around split row `k`: the parent is
/// marked offline+split, each daughter gets a row, each daughter directory
/// holds one reference file per original store file, and the original key
/// range is preserved across the two daughters.
#[tokio::test]
async fn split_produces_two_daughters_each_referencing_every_store_file() {
    let parent = Region::new("orders", Bytes::new(), Bytes::new(), 1);
    let file_ops = InMemoryRegionFileOps::new();
    file_ops.seed(&parent, vec!["00001.sst".into(), "00002.sst".into()]);
    let catalog = InMemoryCatalog::new();

    let (mut txn, daughter_a, daughter_b) =
        SplitTransaction::prepare(&parent, Bytes::from_static(b"k"), 1_700_000_000_500).unwrap();
    txn.execute(&parent, &daughter_a, &daughter_b, &server(), &file_ops, &catalog)
        .await
        .unwrap();

    assert!(catalog.is_parent_offline(&parent).await.unwrap());
    assert_eq!(catalog.location_of(&daughter_a).await.unwrap(), Some(server()));
    assert_eq!(catalog.location_of(&daughter_b).await.unwrap(), Some(server()));
    assert_eq!(file_ops.reference_file_count(&daughter_a).await.unwrap(), 2);
    assert_eq!(file_ops.reference_file_count(&daughter_b).await.unwrap(), 2);

    // The scan range [startKey, endKey) is unchanged end-to-end: daughter A
    // covers [parent.start, k), daughter B covers [k, parent.end).
    assert_eq!(daughter_a.start_key, parent.start_key);
    assert_eq!(daughter_a.end_key, Bytes::from_static(b"k"));
    assert_eq!(daughter_b.start_key, Bytes::from_static(b"k"));
    assert_eq!(daughter_b.end_key, parent.end_key);
    assert!(daughter_a.contains(b"a") && !daughter_a.contains(b"k"));
    assert!(daughter_b.contains(b"k") && daughter_b.contains(b"z"));

    let user_regions = catalog.get_all_user_regions().await.unwrap();
    assert!(!user_regions.iter().any(|r| r.encoded_name() == parent.encoded_name()));
    assert!(user_regions.iter().any(|r| r.encoded_name() == daughter_a.encoded_name()));
    assert!(user_regions.iter().any(|r| r.encoded_name() == daughter_b.encoded_name()));
}
