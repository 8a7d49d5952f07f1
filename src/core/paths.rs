// src/core/paths.rs

//! Coord-store path layout (spec.md §6), relative to a configured root.

pub fn rs(server: &str) -> String {
    format!("/rs/{server}")
}

pub fn unassigned(region_encoded_name: &str) -> String {
    format!("/unassigned/{region_encoded_name}")
}

pub const UNASSIGNED_ROOT: &str = "/unassigned";
pub const RS_ROOT: &str = "/rs";

pub fn table(table_name: &str) -> String {
    format!("/table/{table_name}")
}

pub const MASTER: &str = "/master";
