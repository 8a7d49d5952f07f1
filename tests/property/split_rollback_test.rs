// tests/property/split_rollback_test.rs

//! Property-based tests for the Split Transaction rollback path (spec.md
//! §4.G): whichever pre-PONR step a RegionServer crash lands on, rollback
//! must leave the parent reopenable with zero daughter detritus.

use async_trait::async_trait;
use bytes::Bytes;
use proptest::prelude::*;
use region_assign::core::catalog::{Catalog, InMemoryCatalog};
use region_assign::core::errors::AssignError;
use region_assign::core::region::{Region, ServerName};
use region_assign::core::split::{InMemoryRegionFileOps, RegionFileOps, SplitTransaction};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps an `InMemoryRegionFileOps`, succeeding for the first
/// `oks_before_failure` calls that can fail and erroring on every call after
/// that — standing in for a RegionServer process crashing partway through
/// the pre-PONR sequence.
struct FailAfterN {
    inner: InMemoryRegionFileOps,
    remaining_oks: AtomicUsize,
}

impl FailAfterN {
    fn new(inner: InMemoryRegionFileOps, oks_before_failure: usize) -> Self {
        Self {
            inner,
            remaining_oks: AtomicUsize::new(oks_before_failure),
        }
    }

    fn tick(&self) -> Result<(), AssignError> {
        let updated = self
            .remaining_oks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match updated {
            Ok(_) => Ok(()),
            Err(_) => Err(AssignError::Internal("simulated RegionServer crash".into())),
        }
    }
}

#[async_trait]
impl RegionFileOps for FailAfterN {
    async fn create_split_dir(&self, parent: &Region) -> Result<(), AssignError> {
        self.tick()?;
        self.inner.create_split_dir(parent).await
    }

    async fn delete_split_dir(&self, parent: &Region) -> Result<(), AssignError> {
        self.inner.delete_split_dir(parent).await
    }

    async fn close_parent(&self, parent: &Region) -> Result<Vec<String>, AssignError> {
        self.tick()?;
        self.inner.close_parent(parent).await
    }

    async fn reopen_parent(&self, parent: &Region) -> Result<(), AssignError> {
        self.inner.reopen_parent(parent).await
    }

    async fn create_reference_file(
        &self,
        parent: &Region,
        daughter: &Region,
        store_file: &str,
        tag: &str,
    ) -> Result<(), AssignError> {
        self.tick()?;
        self.inner.create_reference_file(parent, daughter, store_file, tag).await
    }

    async fn materialize_daughter(&self, daughter: &Region) -> Result<(), AssignError> {
        self.tick()?;
        self.inner.materialize_daughter(daughter).await
    }

    async fn delete_daughter_dir(&self, daughter: &Region) -> Result<(), AssignError> {
        self.inner.delete_daughter_dir(daughter).await
    }

    async fn reference_file_count(&self, daughter: &Region) -> Result<usize, AssignError> {
        self.inner.reference_file_count(daughter).await
    }

    async fn remove_from_online(&self, region: &Region) -> Result<(), AssignError> {
        self.tick()?;
        self.inner.remove_from_online(region).await
    }

    async fn add_to_online(&self, region: &Region) -> Result<(), AssignError> {
        self.inner.add_to_online(region).await
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 40, ..ProptestConfig::default() })]

    #[test]
    fn rollback_is_total_regardless_of_crash_point(
        num_store_files in 0..4usize,
        oks_before_failure in 0..6usize,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let parent = Region::new("orders", Bytes::new(), Bytes::new(), 1);
            let store_files: Vec<String> = (0..num_store_files).map(|i| format!("{i}.sst")).collect();

            let inner = InMemoryRegionFileOps::new();
            inner.seed(&parent, store_files);
            let file_ops = FailAfterN::new(inner, oks_before_failure);
            let catalog = InMemoryCatalog::new();
            let server = ServerName::new("10.0.0.1", 60050, 1);

            let (mut txn, daughter_a, daughter_b) =
                SplitTransaction::prepare(&parent, Bytes::from_static(b"k"), 1_700_000_000_777).unwrap();
            let result = txn
                .execute(&parent, &daughter_a, &daughter_b, &server, &file_ops, &catalog)
                .await;

            if result.is_ok() {
                // The call budget covered the whole pre-PONR sequence: the
                // split completed, nothing to roll back.
                assert!(catalog.is_parent_offline(&parent).await.unwrap());
            } else {
                assert!(!catalog.is_parent_offline(&parent).await.unwrap());
                assert_eq!(file_ops.inner.reference_file_count(&daughter_a).await.unwrap(), 0);
                assert_eq!(file_ops.inner.reference_file_count(&daughter_b).await.unwrap(), 0);
                file_ops.inner.reopen_parent(&parent).await.unwrap();
                assert!(file_ops.inner.is_open(&parent));
            }
        });
    }
}
