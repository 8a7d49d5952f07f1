// src/core/rpc/trait_def.rs

//! The logical Master->RegionServer RPC surface (spec.md §6). `flushRegion`
//! and `compactRegion` are explicitly "passthrough, not core" and are not
//! modelled here.

use crate::core::errors::AssignError;
use crate::core::region::{Region, ServerName};
use async_trait::async_trait;

#[async_trait]
pub trait RegionServerRpc: Send + Sync {
    /// Idempotent: if `region` is already open at `target`, returns success
    /// without re-running the open (spec.md §4.F master-failover table).
    async fn open_region(&self, region: &Region, target: &ServerName) -> Result<(), AssignError>;

    /// Idempotent.
    async fn close_region(&self, region: &Region, target: &ServerName) -> Result<(), AssignError>;

    /// `split_row = None` lets the RegionServer pick the split point itself.
    async fn split_region(
        &self,
        region: &Region,
        target: &ServerName,
        split_row: Option<bytes::Bytes>,
    ) -> Result<(), AssignError>;
}
