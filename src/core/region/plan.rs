// src/core/region/plan.rs

//! `RegionPlan` — the Master's in-memory record of where a region should
//! end up — and `TableState`, the coord-store-persisted enable/disable state.

use super::descriptor::ServerName;
use serde::{Deserialize, Serialize};

/// `(regionName, source?, destination)`. Held in-memory on the Master.
/// `destination = None` encodes "do not reopen" (disable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPlan {
    pub region_name: String,
    pub source: Option<ServerName>,
    pub destination: Option<ServerName>,
}

impl RegionPlan {
    pub fn assign(region_name: impl Into<String>, destination: ServerName) -> Self {
        Self {
            region_name: region_name.into(),
            source: None,
            destination: Some(destination),
        }
    }

    pub fn r#move(
        region_name: impl Into<String>,
        source: ServerName,
        destination: ServerName,
    ) -> Self {
        Self {
            region_name: region_name.into(),
            source: Some(source),
            destination: Some(destination),
        }
    }

    pub fn disable(region_name: impl Into<String>, source: ServerName) -> Self {
        Self {
            region_name: region_name.into(),
            source: Some(source),
            destination: None,
        }
    }

    pub fn is_disable(&self) -> bool {
        self.destination.is_none()
    }
}

/// Persisted in the coord-store at `/table/<tableName>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableState {
    Enabled,
    Disabled,
    Enabling,
    Disabling,
}

impl std::fmt::Display for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TableState::Enabled => "ENABLED",
            TableState::Disabled => "DISABLED",
            TableState::Enabling => "ENABLING",
            TableState::Disabling => "DISABLING",
        };
        f.write_str(s)
    }
}
