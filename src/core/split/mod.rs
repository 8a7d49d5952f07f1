// src/core/split/mod.rs

//! The Split Transaction protocol (spec.md §4.G): a RegionServer-local,
//! journaled, reversible-until-PONR procedure. Grounded on spec.md §9's
//! explicit guidance to model the journal as a tagged variant sequence with
//! a pure inverse-step function.

pub mod fileops;
pub mod journal;
pub mod transaction;

pub use fileops::{InMemoryRegionFileOps, RegionFileOps};
pub use journal::{inverse_step, InverseAction, Journal, JournalEntry};
pub use transaction::{recover_split_detritus, SplitTransaction};
