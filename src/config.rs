// src/config.rs

//! `MasterConfig`: TOML-loaded configuration for the assignment core,
//! following the teacher's `Config::from_file` pattern — read file, parse,
//! validate, return.

use crate::core::assignment::manager::AssignmentConfig;
use crate::core::errors::AssignError;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_coord_store_root() -> String {
    "/hbase".to_string()
}

fn default_min_servers_to_start() -> usize {
    1
}

fn default_fresh_start_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(30)
}

fn default_opening_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(30)
}

fn default_closing_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(30)
}

fn default_offline_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(10)
}

fn default_balancer_tick_interval() -> std::time::Duration {
    std::time::Duration::from_secs(60)
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    16000
}

fn default_metrics_port() -> u16 {
    9898
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_demo_table_name() -> String {
    "demo".to_string()
}

fn default_demo_region_count() -> usize {
    9
}

/// Top-level configuration for a Master process, TOML-loaded via
/// [`MasterConfig::from_file`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Root path under which all coord-store layout paths (spec.md §6) are
    /// rooted.
    #[serde(default = "default_coord_store_root")]
    pub coord_store_root: String,

    #[serde(default = "default_min_servers_to_start")]
    pub min_servers_to_start: usize,

    #[serde(default = "default_fresh_start_timeout", with = "humantime_serde")]
    pub fresh_start_timeout: std::time::Duration,

    #[serde(default = "default_opening_timeout", with = "humantime_serde")]
    pub opening_timeout: std::time::Duration,
    #[serde(default = "default_closing_timeout", with = "humantime_serde")]
    pub closing_timeout: std::time::Duration,
    #[serde(default = "default_offline_timeout", with = "humantime_serde")]
    pub offline_timeout: std::time::Duration,

    #[serde(default = "default_balancer_tick_interval", with = "humantime_serde")]
    pub balancer_tick_interval: std::time::Duration,

    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name of the demo user table seeded into the catalog at startup, since
    /// table creation itself is out of scope (spec.md §1).
    #[serde(default = "default_demo_table_name")]
    pub demo_table_name: String,
    /// Number of regions to seed for the demo table.
    #[serde(default = "default_demo_region_count")]
    pub demo_region_count: usize,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            coord_store_root: default_coord_store_root(),
            min_servers_to_start: default_min_servers_to_start(),
            fresh_start_timeout: default_fresh_start_timeout(),
            opening_timeout: default_opening_timeout(),
            closing_timeout: default_closing_timeout(),
            offline_timeout: default_offline_timeout(),
            balancer_tick_interval: default_balancer_tick_interval(),
            bind_host: default_bind_host(),
            bind_port: default_bind_port(),
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
            demo_table_name: default_demo_table_name(),
            demo_region_count: default_demo_region_count(),
        }
    }
}

impl MasterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssignError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssignError> {
        if self.min_servers_to_start == 0 {
            return Err(AssignError::Internal("min_servers_to_start must be at least 1".into()));
        }
        if self.bind_port == 0 {
            return Err(AssignError::Internal("bind_port must be nonzero".into()));
        }
        if self.opening_timeout.is_zero() || self.closing_timeout.is_zero() || self.offline_timeout.is_zero() {
            return Err(AssignError::Internal("per-state timeouts must be nonzero".into()));
        }
        Ok(())
    }
}

impl From<&MasterConfig> for AssignmentConfig {
    fn from(config: &MasterConfig) -> Self {
        Self {
            opening_timeout: config.opening_timeout,
            closing_timeout: config.closing_timeout,
            offline_timeout: config.offline_timeout,
            min_servers_to_start: config.min_servers_to_start,
            fresh_start_timeout: config.fresh_start_timeout,
        }
    }
}
