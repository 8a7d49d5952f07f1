// src/core/catalog/memory.rs

//! `InMemoryCatalog`: a `dashmap`-backed reference `Catalog`, grounded on
//! the teacher's sharded-map style in `core::database::core::Db`.

use super::store::Catalog;
use crate::core::errors::AssignError;
use crate::core::region::{Region, ServerName};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CatalogRow {
    region: Region,
    server: Option<ServerName>,
    offline: bool,
    split: bool,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    rows: DashMap<String, CatalogRow>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `region` with no server assigned, standing in for the
    /// out-of-scope table-creation path (spec.md §1) so the demo binary and
    /// integration tests have user regions to bootstrap onto.
    pub fn seed_region(&self, region: Region) {
        self.rows.entry(region.encoded_name()).or_insert_with(|| CatalogRow {
            region,
            server: None,
            offline: false,
            split: false,
        });
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_regions_of_table(&self, table: &str) -> Result<Vec<Region>, AssignError> {
        Ok(self
            .rows
            .iter()
            .filter(|e| e.value().region.table == table && !e.value().offline)
            .map(|e| e.value().region.clone())
            .collect())
    }

    async fn update_region_location(&self, region: &Region, server: &ServerName) -> Result<(), AssignError> {
        self.rows
            .entry(region.encoded_name())
            .and_modify(|row| row.server = Some(server.clone()))
            .or_insert_with(|| CatalogRow {
                region: region.clone(),
                server: Some(server.clone()),
                offline: false,
                split: false,
            });
        Ok(())
    }

    async fn offline_parent(
        &self,
        parent: &Region,
        daughter_a: &Region,
        daughter_b: &Region,
    ) -> Result<(), AssignError> {
        self.rows
            .entry(parent.encoded_name())
            .and_modify(|row| {
                row.offline = true;
                row.split = true;
            })
            .or_insert_with(|| CatalogRow {
                region: parent.clone(),
                server: None,
                offline: true,
                split: true,
            });
        for daughter in [daughter_a, daughter_b] {
            self.rows.entry(daughter.encoded_name()).or_insert_with(|| CatalogRow {
                region: daughter.clone(),
                server: None,
                offline: false,
                split: false,
            });
        }
        Ok(())
    }

    async fn get_all_user_regions(&self) -> Result<Vec<Region>, AssignError> {
        use crate::core::region::{META_TABLE, ROOT_TABLE};
        Ok(self
            .rows
            .iter()
            .filter(|e| {
                !e.value().offline
                    && e.value().region.table != ROOT_TABLE
                    && e.value().region.table != META_TABLE
            })
            .map(|e| e.value().region.clone())
            .collect())
    }

    async fn location_of(&self, region: &Region) -> Result<Option<ServerName>, AssignError> {
        Ok(self
            .rows
            .get(&region.encoded_name())
            .and_then(|row| row.server.clone()))
    }

    async fn is_parent_offline(&self, region: &Region) -> Result<bool, AssignError> {
        Ok(self
            .rows
            .get(&region.encoded_name())
            .map(|row| row.offline && row.split)
            .unwrap_or(false))
    }
}
