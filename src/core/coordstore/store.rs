// src/core/coordstore/store.rs

//! The `CoordStore` trait: spec.md §4.A's capability list verbatim.

use super::node::{SessionId, WatchEvent};
use crate::core::errors::AssignError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::oneshot;

/// A versioned, watchable node tree standing in for an external
/// strongly-consistent coordination service. All mutual exclusion in the
/// assignment core goes through CAS on versioned nodes here; ephemeral
/// nodes are the failure-detection mechanism. Implementations must not
/// let callers cache reads past a watch firing (spec.md §9).
#[async_trait]
pub trait CoordStore: Send + Sync {
    /// `get(path) -> (data, version) | NotFound`.
    async fn get(&self, path: &str) -> Result<(Bytes, u64), AssignError>;

    async fn exists(&self, path: &str) -> Result<bool, AssignError>;

    /// `create(path, data, ephemeral?) -> ok | Exists`.
    async fn create(
        &self,
        path: &str,
        data: Bytes,
        ephemeral: Option<SessionId>,
    ) -> Result<(), AssignError>;

    /// Creates the node if absent, or unconditionally overwrites it (bumping
    /// its version) if present — the "force" semantics spec.md §4.F grants
    /// the Master when driving a region to `OFFLINE` regardless of prior
    /// state.
    async fn create_or_force(
        &self,
        path: &str,
        data: Bytes,
        ephemeral: Option<SessionId>,
    ) -> Result<u64, AssignError>;

    /// `setData(path, data, expectedVersion) -> ok | BadVersion | NotFound`.
    /// Returns the node's new version on success.
    async fn set_data(&self, path: &str, data: Bytes, expected_version: u64) -> Result<u64, AssignError>;

    /// `delete(path, expectedVersion) -> ok | BadVersion | NotFound`.
    async fn delete(&self, path: &str, expected_version: u64) -> Result<(), AssignError>;

    async fn list(&self, path: &str) -> Result<Vec<String>, AssignError>;

    /// Deletes every child of `path`. Spec.md §4.F step 3: "only permitted
    /// at fresh start".
    async fn delete_children(&self, path: &str) -> Result<(), AssignError>;

    async fn watch_exists(&self, path: &str) -> oneshot::Receiver<WatchEvent>;

    async fn watch_data(&self, path: &str) -> oneshot::Receiver<WatchEvent>;

    async fn watch_children(&self, path: &str) -> oneshot::Receiver<WatchEvent>;

    /// Allocates a fresh session for ephemeral nodes created by the caller.
    fn new_session(&self) -> SessionId;

    /// Simulates loss of `session`: deletes every ephemeral node it owns and
    /// resolves any outstanding watch on them with `SessionExpired`.
    async fn expire_session(&self, session: SessionId);
}
