// src/core/coordstore/local.rs

//! `LocalCoordStore`: an in-memory `CoordStore`, grounded on the teacher's
//! `DashMap`-based `ClusterState` (sharded concurrent map of node state) and
//! its versioned `slots_map` CAS pattern.

use super::node::{NodeKind, SessionId, StoredNode, WatchEvent};
use super::store::CoordStore;
use crate::core::errors::AssignError;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct LocalCoordStore {
    nodes: DashMap<String, StoredNode>,
    exists_watches: DashMap<String, Vec<oneshot::Sender<WatchEvent>>>,
    data_watches: DashMap<String, Vec<oneshot::Sender<WatchEvent>>>,
    children_watches: DashMap<String, Vec<oneshot::Sender<WatchEvent>>>,
    sessions: DashMap<SessionId, HashSet<String>>,
}

impl LocalCoordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn parent_of(path: &str) -> String {
        match path.rfind('/') {
            Some(0) => "/".to_string(),
            Some(idx) => path[..idx].to_string(),
            None => "/".to_string(),
        }
    }

    fn fire(watches: &DashMap<String, Vec<oneshot::Sender<WatchEvent>>>, path: &str, event: WatchEvent) {
        if let Some((_, senders)) = watches.remove(path) {
            for tx in senders {
                let _ = tx.send(event);
            }
        }
    }

    fn track_ephemeral(&self, path: &str, kind: NodeKind) {
        if let NodeKind::Ephemeral(session) = kind {
            self.sessions.entry(session).or_default().insert(path.to_string());
        }
    }
}

#[async_trait]
impl CoordStore for LocalCoordStore {
    async fn get(&self, path: &str) -> Result<(Bytes, u64), AssignError> {
        self.nodes
            .get(path)
            .map(|n| (n.data.clone(), n.version))
            .ok_or_else(|| AssignError::NodeNotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> Result<bool, AssignError> {
        Ok(self.nodes.contains_key(path))
    }

    async fn create(
        &self,
        path: &str,
        data: Bytes,
        ephemeral: Option<SessionId>,
    ) -> Result<(), AssignError> {
        if self.nodes.contains_key(path) {
            return Err(AssignError::NodeExists(path.to_string()));
        }
        let kind = match ephemeral {
            Some(session) => NodeKind::Ephemeral(session),
            None => NodeKind::Persistent,
        };
        self.nodes.insert(
            path.to_string(),
            StoredNode {
                data,
                version: 0,
                kind,
            },
        );
        self.track_ephemeral(path, kind);
        Self::fire(&self.exists_watches, path, WatchEvent::Created);
        Self::fire(&self.children_watches, &Self::parent_of(path), WatchEvent::ChildrenChanged);
        Ok(())
    }

    async fn create_or_force(
        &self,
        path: &str,
        data: Bytes,
        ephemeral: Option<SessionId>,
    ) -> Result<u64, AssignError> {
        let kind = match ephemeral {
            Some(session) => NodeKind::Ephemeral(session),
            None => NodeKind::Persistent,
        };
        let created = !self.nodes.contains_key(path);
        let version = {
            let mut entry = self.nodes.entry(path.to_string()).or_insert(StoredNode {
                data: data.clone(),
                version: 0,
                kind,
            });
            if !created {
                entry.data = data;
                entry.version += 1;
                entry.kind = kind;
            }
            entry.version
        };
        self.track_ephemeral(path, kind);
        if created {
            Self::fire(&self.exists_watches, path, WatchEvent::Created);
            Self::fire(&self.children_watches, &Self::parent_of(path), WatchEvent::ChildrenChanged);
        } else {
            Self::fire(&self.data_watches, path, WatchEvent::DataChanged);
        }
        Ok(version)
    }

    async fn set_data(&self, path: &str, data: Bytes, expected_version: u64) -> Result<u64, AssignError> {
        let mut node = self
            .nodes
            .get_mut(path)
            .ok_or_else(|| AssignError::NodeNotFound(path.to_string()))?;
        if node.version != expected_version {
            return Err(AssignError::BadVersion {
                path: path.to_string(),
                expected: expected_version,
                actual: node.version,
            });
        }
        node.data = data;
        node.version += 1;
        let new_version = node.version;
        drop(node);
        Self::fire(&self.data_watches, path, WatchEvent::DataChanged);
        Ok(new_version)
    }

    async fn delete(&self, path: &str, expected_version: u64) -> Result<(), AssignError> {
        {
            let node = self
                .nodes
                .get(path)
                .ok_or_else(|| AssignError::NodeNotFound(path.to_string()))?;
            if node.version != expected_version {
                return Err(AssignError::BadVersion {
                    path: path.to_string(),
                    expected: expected_version,
                    actual: node.version,
                });
            }
        }
        self.nodes.remove(path);
        Self::fire(&self.data_watches, path, WatchEvent::Deleted);
        Self::fire(&self.children_watches, &Self::parent_of(path), WatchEvent::ChildrenChanged);
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, AssignError> {
        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        Ok(self
            .nodes
            .iter()
            .filter_map(|entry| {
                let key = entry.key();
                let suffix = key.strip_prefix(&prefix)?;
                (!suffix.is_empty() && !suffix.contains('/')).then(|| suffix.to_string())
            })
            .collect())
    }

    async fn delete_children(&self, path: &str) -> Result<(), AssignError> {
        for child in self.list(path).await? {
            let child_path = format!("{}/{}", path.trim_end_matches('/'), child);
            self.nodes.remove(&child_path);
            Self::fire(&self.data_watches, &child_path, WatchEvent::Deleted);
        }
        Self::fire(&self.children_watches, path, WatchEvent::ChildrenChanged);
        Ok(())
    }

    async fn watch_exists(&self, path: &str) -> oneshot::Receiver<WatchEvent> {
        let (tx, rx) = oneshot::channel();
        self.exists_watches.entry(path.to_string()).or_default().push(tx);
        rx
    }

    async fn watch_data(&self, path: &str) -> oneshot::Receiver<WatchEvent> {
        let (tx, rx) = oneshot::channel();
        self.data_watches.entry(path.to_string()).or_default().push(tx);
        rx
    }

    async fn watch_children(&self, path: &str) -> oneshot::Receiver<WatchEvent> {
        let (tx, rx) = oneshot::channel();
        self.children_watches.entry(path.to_string()).or_default().push(tx);
        rx
    }

    fn new_session(&self) -> SessionId {
        let session = SessionId::fresh();
        self.sessions.insert(session, HashSet::new());
        session
    }

    async fn expire_session(&self, session: SessionId) {
        let Some((_, owned)) = self.sessions.remove(&session) else {
            return;
        };
        for path in owned {
            self.nodes.remove(&path);
            Self::fire(&self.data_watches, &path, WatchEvent::SessionExpired);
            Self::fire(&self.exists_watches, &path, WatchEvent::SessionExpired);
            Self::fire(&self.children_watches, &Self::parent_of(&path), WatchEvent::ChildrenChanged);
        }
    }
}
