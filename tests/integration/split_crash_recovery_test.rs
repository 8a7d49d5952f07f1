// tests/integration/split_crash_recovery_test.rs

use region_assign::core::region::Region;
use region_assign::core::split::{recover_split_detritus, InMemoryRegionFileOps, RegionFileOps};
use bytes::Bytes;

/// Crashing a RegionServer after `StartedRegion(A)` but before
/// `StartedRegion(B)` leaves split detritus: a split directory, a
/// materialized daughter A, and an un-materialized daughter B. Recovery at
/// the next open deletes all of it and the parent reopens intact.
#[tokio::test]
async fn crash_between_daughter_a_and_b_cleans_up_and_parent_reopens() {
    let parent = Region::new("orders", Bytes::new(), Bytes::new(), 1);
    let daughter_a = Region::new("orders", Bytes::new(), Bytes::from_static(b"k"), 2);
    let daughter_b = Region::new("orders", Bytes::from_static(b"k"), Bytes::new(), 2);

    let file_ops = InMemoryRegionFileOps::new();
    file_ops.seed(&parent, vec!["00001.sst".into()]);

    // Manually drive the pre-PONR steps up through StartedRegion(A), then
    // stop — standing in for a RegionServer process crash at that point.
    file_ops.create_split_dir(&parent).await.unwrap();
    file_ops.close_parent(&parent).await.unwrap();
    file_ops.remove_from_online(&parent).await.unwrap();
    file_ops
        .create_reference_file(&parent, &daughter_a, "00001.sst", "bottom")
        .await
        .unwrap();
    file_ops.materialize_daughter(&daughter_a).await.unwrap();
    assert_eq!(file_ops.reference_file_count(&daughter_a).await.unwrap(), 1);
    assert!(!file_ops.is_open(&parent));

    // Retry: the next open of `parent` first runs crash recovery.
    recover_split_detritus(&parent, &[daughter_a.clone(), daughter_b.clone()], &file_ops)
        .await
        .unwrap();
    assert_eq!(file_ops.reference_file_count(&daughter_a).await.unwrap(), 0);
    assert_eq!(file_ops.reference_file_count(&daughter_b).await.unwrap(), 0);

    file_ops.reopen_parent(&parent).await.unwrap();
    assert!(file_ops.is_open(&parent));
}
