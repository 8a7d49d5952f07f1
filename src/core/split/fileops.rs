// src/core/split/fileops.rs

//! `RegionFileOps`: the filesystem-shaped side effects of a split,
//! injected as a trait so `SplitTransaction` is unit-testable without a
//! real filesystem — grounded on the teacher's pattern of injecting
//! `Catalog`/`CoordStore` traits rather than calling concrete I/O directly
//! from protocol code.

use crate::core::errors::AssignError;
use crate::core::region::Region;
use async_trait::async_trait;
use dashmap::DashMap;

#[async_trait]
pub trait RegionFileOps: Send + Sync {
    async fn create_split_dir(&self, parent: &Region) -> Result<(), AssignError>;
    async fn delete_split_dir(&self, parent: &Region) -> Result<(), AssignError>;

    /// Closes `parent` locally and returns the names of its store files.
    async fn close_parent(&self, parent: &Region) -> Result<Vec<String>, AssignError>;
    async fn reopen_parent(&self, parent: &Region) -> Result<(), AssignError>;

    /// Creates a reference file under the split directory for one half
    /// (`bottom` for daughter A, `top` for daughter B) of `store_file`.
    async fn create_reference_file(
        &self,
        parent: &Region,
        daughter: &Region,
        store_file: &str,
        tag: &str,
    ) -> Result<(), AssignError>;

    /// Moves `daughter`'s materialized files from the split directory into
    /// its final region directory.
    async fn materialize_daughter(&self, daughter: &Region) -> Result<(), AssignError>;
    async fn delete_daughter_dir(&self, daughter: &Region) -> Result<(), AssignError>;

    async fn reference_file_count(&self, daughter: &Region) -> Result<usize, AssignError>;

    /// Removes `region` from the server's local online-regions map
    /// (spec.md §4.G step 3).
    async fn remove_from_online(&self, region: &Region) -> Result<(), AssignError>;
    /// Re-adds `region` to the server's local online-regions map (used by
    /// rollback, and by publishing a freshly materialized daughter).
    async fn add_to_online(&self, region: &Region) -> Result<(), AssignError>;
}

/// An in-memory `RegionFileOps` keyed by region encoded name, standing in
/// for a real region-directory layout on disk.
#[derive(Default)]
pub struct InMemoryRegionFileOps {
    /// encoded_name(region) -> store file names.
    store_files: DashMap<String, Vec<String>>,
    /// encoded_name(daughter) -> reference file count, present only once
    /// materialized into its final directory.
    daughter_dirs: DashMap<String, usize>,
    split_dirs: DashMap<String, usize>,
    parent_open: DashMap<String, bool>,
}

impl InMemoryRegionFileOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `region` with `store_files` and marks it open, as if the
    /// RegionServer already had it loaded.
    pub fn seed(&self, region: &Region, store_files: Vec<String>) {
        self.store_files.insert(region.encoded_name(), store_files);
        self.parent_open.insert(region.encoded_name(), true);
    }

    pub fn is_open(&self, region: &Region) -> bool {
        self.parent_open.get(&region.encoded_name()).map(|v| *v).unwrap_or(false)
    }
}

#[async_trait]
impl RegionFileOps for InMemoryRegionFileOps {
    async fn create_split_dir(&self, parent: &Region) -> Result<(), AssignError> {
        self.split_dirs.insert(parent.encoded_name(), 0);
        Ok(())
    }

    async fn delete_split_dir(&self, parent: &Region) -> Result<(), AssignError> {
        self.split_dirs.remove(&parent.encoded_name());
        Ok(())
    }

    async fn close_parent(&self, parent: &Region) -> Result<Vec<String>, AssignError> {
        self.parent_open.insert(parent.encoded_name(), false);
        Ok(self
            .store_files
            .get(&parent.encoded_name())
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    async fn reopen_parent(&self, parent: &Region) -> Result<(), AssignError> {
        self.parent_open.insert(parent.encoded_name(), true);
        Ok(())
    }

    async fn create_reference_file(
        &self,
        _parent: &Region,
        daughter: &Region,
        _store_file: &str,
        _tag: &str,
    ) -> Result<(), AssignError> {
        *self.split_dirs.entry(daughter.encoded_name()).or_insert(0) += 1;
        Ok(())
    }

    async fn materialize_daughter(&self, daughter: &Region) -> Result<(), AssignError> {
        let refs = self.split_dirs.get(&daughter.encoded_name()).map(|v| *v).unwrap_or(0);
        self.daughter_dirs.insert(daughter.encoded_name(), refs);
        Ok(())
    }

    async fn delete_daughter_dir(&self, daughter: &Region) -> Result<(), AssignError> {
        self.daughter_dirs.remove(&daughter.encoded_name());
        Ok(())
    }

    async fn reference_file_count(&self, daughter: &Region) -> Result<usize, AssignError> {
        Ok(self.daughter_dirs.get(&daughter.encoded_name()).map(|v| *v).unwrap_or(0))
    }

    async fn remove_from_online(&self, region: &Region) -> Result<(), AssignError> {
        self.parent_open.insert(region.encoded_name(), false);
        Ok(())
    }

    async fn add_to_online(&self, region: &Region) -> Result<(), AssignError> {
        self.parent_open.insert(region.encoded_name(), true);
        Ok(())
    }
}
