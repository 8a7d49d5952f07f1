// src/core/errors.rs

//! Defines the primary error type for the assignment core.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, covering every failure category in the region
/// assignment core's error taxonomy. `thiserror` gives us clean `Display`
/// impls; we derive `Clone` manually because `std::io::Error` isn't
/// cloneable, wrapping it in an `Arc` the same way the rest of this
/// codebase wraps IO errors.
#[derive(Error, Debug)]
pub enum AssignError {
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    /// The coord-store is unreachable or not responding. Callers retry
    /// with backoff; if this persists a Master yields `/master` and exits.
    #[error("coord-store unavailable: {0}")]
    CoordStoreUnavailable(String),

    /// The catalog tables could not be reached. Surfaces to admin callers
    /// as an operation timeout.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A RegionServer RPC could not be delivered. Treated as possibly-dead;
    /// the transition timeout will re-drive assignment.
    #[error("region server unreachable: {0}")]
    RegionServerUnreachable(String),

    /// A CAS write lost the race against a concurrent version bump. Callers
    /// must reconcile from the freshly observed state, never overwrite blindly.
    #[error("bad version for {path}: expected {expected}, found {actual}")]
    BadVersion {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// A coord-store node was expected to exist (or not) and didn't match.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A coord-store node already existed where a fresh `create` was required.
    #[error("node already exists: {0}")]
    NodeExists(String),

    /// A transition was requested that the state machine does not permit
    /// from the observed state, e.g. CLOSED -> OPENING requested by a
    /// non-Master actor. Hard error; the offending operation is abandoned.
    #[error("invalid transition for {region}: {from} -> {attempted}")]
    InvalidTransition {
        region: String,
        from: String,
        attempted: String,
    },

    /// The coord-store session backing this component was lost. The
    /// component must abort in-flight work and restart its watches.
    #[error("coord-store session expired")]
    SessionExpired,

    /// A split was requested with a split row that violates the region's
    /// key range invariants.
    #[error("invalid split row: {0}")]
    InvalidSplitRow(String),

    /// The split transaction passed its point of no return and then hit an
    /// unrecoverable error; per policy the process must abort.
    #[error("split transaction for {0} failed past point of no return")]
    PastPointOfNoReturn(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Clone for AssignError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(Arc::clone(e)),
            Self::CoordStoreUnavailable(s) => Self::CoordStoreUnavailable(s.clone()),
            Self::CatalogUnavailable(s) => Self::CatalogUnavailable(s.clone()),
            Self::RegionServerUnreachable(s) => Self::RegionServerUnreachable(s.clone()),
            Self::BadVersion {
                path,
                expected,
                actual,
            } => Self::BadVersion {
                path: path.clone(),
                expected: *expected,
                actual: *actual,
            },
            Self::NodeNotFound(s) => Self::NodeNotFound(s.clone()),
            Self::NodeExists(s) => Self::NodeExists(s.clone()),
            Self::InvalidTransition {
                region,
                from,
                attempted,
            } => Self::InvalidTransition {
                region: region.clone(),
                from: from.clone(),
                attempted: attempted.clone(),
            },
            Self::SessionExpired => Self::SessionExpired,
            Self::InvalidSplitRow(s) => Self::InvalidSplitRow(s.clone()),
            Self::PastPointOfNoReturn(s) => Self::PastPointOfNoReturn(s.clone()),
            Self::Internal(s) => Self::Internal(s.clone()),
        }
    }
}

impl From<std::io::Error> for AssignError {
    fn from(e: std::io::Error) -> Self {
        AssignError::Io(Arc::new(e))
    }
}

impl From<toml::de::Error> for AssignError {
    fn from(e: toml::de::Error) -> Self {
        AssignError::Internal(format!("failed to parse TOML: {e}"))
    }
}
