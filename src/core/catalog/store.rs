// src/core/catalog/store.rs

//! The `Catalog` trait: spec.md §4.C's logical operations. Physical
//! encoding (system-table row format) is explicitly a file-format concern
//! out of scope per spec.md §1.

use crate::core::errors::AssignError;
use crate::core::region::{Region, ServerName};
use async_trait::async_trait;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_regions_of_table(&self, table: &str) -> Result<Vec<Region>, AssignError>;

    async fn update_region_location(&self, region: &Region, server: &ServerName) -> Result<(), AssignError>;

    /// Atomically marks `parent` offline-pending-garbage-collection and
    /// creates rows for the two daughters.
    async fn offline_parent(
        &self,
        parent: &Region,
        daughter_a: &Region,
        daughter_b: &Region,
    ) -> Result<(), AssignError>;

    async fn get_all_user_regions(&self) -> Result<Vec<Region>, AssignError>;

    /// Current server location of `region`, if recorded.
    async fn location_of(&self, region: &Region) -> Result<Option<ServerName>, AssignError>;

    async fn is_parent_offline(&self, region: &Region) -> Result<bool, AssignError>;
}
