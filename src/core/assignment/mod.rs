// src/core/assignment/mod.rs

//! The Assignment Manager (spec.md §4.F): the state machine driving every
//! region between `OFFLINE`/`OPENING`/`OPENED`/`CLOSING`/`CLOSED`. Carries
//! the Master's process-wide mutable state behind a single façade, matching
//! spec.md §9's "expose a single façade rather than singletons" directive,
//! grounded on `warden::worker::MasterMonitor` as the analogous
//! single-façade-per-responsibility pattern.

pub mod bootstrap;
pub mod dispatch;
pub mod failover;
pub mod manager;

pub use manager::AssignmentManager;
