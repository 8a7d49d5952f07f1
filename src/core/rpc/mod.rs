// src/core/rpc/mod.rs

//! Master<->RegionServer RPC boundary (spec.md §6, ambient §4.H): wire
//! encoding is out of scope, so this is a plain async trait plus a
//! `SimulatedRegionServer` reference implementation used by tests and the
//! demo binary, grounded on `warden::client::WardenClient`'s "this
//! process's view of a peer instance" role.

pub mod simulated;
pub mod trait_def;

pub use simulated::SimulatedRegionServer;
pub use trait_def::RegionServerRpc;
