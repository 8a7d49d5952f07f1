// src/core/metrics.rs

//! Defines and registers the Prometheus metrics for the assignment core.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_gauge, register_histogram, Counter, Gauge, Histogram, TextEncoder,
};

lazy_static! {
    /// The number of regions currently `regionsInTransition` on the Master.
    pub static ref REGIONS_IN_TRANSITION: Gauge =
        register_gauge!("assign_regions_in_transition", "Number of regions currently in transition.").unwrap();

    /// Total `assign()` calls issued by the Assignment Manager.
    pub static ref ASSIGN_TOTAL: Counter =
        register_counter!("assign_assign_total", "Total number of assign operations issued.").unwrap();
    /// Total `unassign()` calls issued by the Assignment Manager.
    pub static ref UNASSIGN_TOTAL: Counter =
        register_counter!("assign_unassign_total", "Total number of unassign operations issued.").unwrap();
    /// Total split transactions started.
    pub static ref SPLIT_TOTAL: Counter =
        register_counter!("assign_split_total", "Total number of split transactions started.").unwrap();
    /// Total split transactions rolled back before PONR.
    pub static ref ROLLBACK_TOTAL: Counter =
        register_counter!("assign_rollback_total", "Total number of split transactions rolled back.").unwrap();
    /// Total balancer-proposed moves enacted.
    pub static ref BALANCER_MOVES_TOTAL: Counter =
        register_counter!("assign_balancer_moves_total", "Total number of balancer moves enacted.").unwrap();
    /// Total RegionServer failures observed (ephemeral `/rs` node lost).
    pub static ref SERVER_DOWN_TOTAL: Counter =
        register_counter!("assign_server_down_total", "Total number of RegionServer failures observed.").unwrap();

    /// Wall-clock time from `assign()` to the `OPENED` watch firing.
    pub static ref REGION_OPEN_DURATION_SECONDS: Histogram = register_histogram!(
        "assign_region_open_duration_seconds",
        "Time from assign() to the OPENED transition being observed."
    )
    .unwrap();
}

pub fn inc_assign_total() {
    ASSIGN_TOTAL.inc();
}

pub fn inc_unassign_total() {
    UNASSIGN_TOTAL.inc();
}

pub fn inc_split_total() {
    SPLIT_TOTAL.inc();
}

pub fn inc_rollback_total() {
    ROLLBACK_TOTAL.inc();
}

pub fn inc_balancer_moves_total(n: u64) {
    BALANCER_MOVES_TOTAL.inc_by(n as f64);
}

pub fn inc_server_down_total() {
    SERVER_DOWN_TOTAL.inc();
}

pub fn set_regions_in_transition(n: usize) {
    REGIONS_IN_TRANSITION.set(n as f64);
}

pub fn observe_region_open_duration(seconds: f64) {
    REGION_OPEN_DURATION_SECONDS.observe(seconds);
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).unwrap()
}
