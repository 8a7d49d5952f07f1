// src/core/region/descriptor.rs

//! Core identity types: `Region`, `ServerName`, and the encoded-name hash
//! used to key coord-store and catalog entries.

use bytes::Bytes;
use murmur3::murmur3_x64_128;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// `host:port:startCode`. The `startCode` distinguishes process incarnations
/// on the same address; a restarted server is a *different* `ServerName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerName {
    pub host: String,
    pub port: u16,
    pub start_code: i64,
}

impl ServerName {
    pub fn new(host: impl Into<String>, port: u16, start_code: i64) -> Self {
        Self {
            host: host.into(),
            port,
            start_code,
        }
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.port, self.start_code)
    }
}

impl FromStr for ServerName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let host = parts.next().ok_or("missing host")?.to_string();
        let port: u16 = parts
            .next()
            .ok_or("missing port")?
            .parse()
            .map_err(|e| format!("invalid port: {e}"))?;
        let start_code: i64 = parts
            .next()
            .ok_or("missing start code")?
            .parse()
            .map_err(|e| format!("invalid start code: {e}"))?;
        Ok(Self::new(host, port, start_code))
    }
}

/// A contiguous half-open key range `[start_key, end_key)` belonging to a
/// table. Identified by an immutable `region_id` (creation timestamp,
/// strictly monotonic per parent during splits). An empty `end_key` means
/// "no upper bound" (the last region of a table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub table: String,
    pub start_key: Bytes,
    pub end_key: Bytes,
    pub region_id: i64,
}

impl Region {
    pub fn new(table: impl Into<String>, start_key: Bytes, end_key: Bytes, region_id: i64) -> Self {
        Self {
            table: table.into(),
            start_key,
            end_key,
            region_id,
        }
    }

    /// The first region of a fresh table: the whole keyspace, no transition
    /// in progress.
    pub fn first(table: impl Into<String>, region_id: i64) -> Self {
        Self::new(table, Bytes::new(), Bytes::new(), region_id)
    }

    /// Whether `key` falls within `[start_key, end_key)`.
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start_key.as_ref()
            && (self.end_key.is_empty() || key < self.end_key.as_ref())
    }

    /// `hash(table, startKey, regionId)`, stable and URL/path-safe. Used to
    /// key coord-store `/unassigned` nodes and catalog rows.
    pub fn encoded_name(&self) -> String {
        encoded_name(&self.table, &self.start_key, self.region_id)
    }

    pub fn is_root(&self) -> bool {
        self.table == ROOT_TABLE
    }

    pub fn is_meta(&self) -> bool {
        self.table == META_TABLE
    }
}

/// The catalog's own root table, bootstrapped before any other region.
pub const ROOT_TABLE: &str = "-ROOT-";
/// The catalog's meta table, bootstrapped immediately after root.
pub const META_TABLE: &str = ".META.";

fn encoded_name(table: &str, start_key: &[u8], region_id: i64) -> String {
    let mut buf = Vec::with_capacity(table.len() + start_key.len() + 8);
    buf.extend_from_slice(table.as_bytes());
    buf.extend_from_slice(start_key);
    buf.extend_from_slice(&region_id.to_be_bytes());
    let hash = murmur3_x64_128(&mut Cursor::new(&buf), 0)
        .expect("hashing an in-memory buffer cannot fail");
    format!("{hash:032x}")
}

/// Computes the `region_id` for a daughter region produced by splitting
/// `parent` at the current wall-clock time, applying the clock-skew
/// correction from the data model: if `now <= parent.region_id`, the
/// daughter gets `parent.region_id + 1` instead of the (non-monotonic) clock
/// reading.
pub fn daughter_region_id(parent_region_id: i64, now_millis: i64) -> i64 {
    if now_millis <= parent_region_id {
        parent_region_id + 1
    } else {
        now_millis
    }
}
