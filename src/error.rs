//! Error type shared by the clustering core, the viewport machine and the CLI.
//!
//! Nothing here is fatal to a host: invalid points are filtered, bad camera
//! targets are rejected with the viewport left as it was, and stale cluster
//! ids are reported so the caller can re-query.

use thiserror::Error;

use crate::cluster::ClusterId;

#[derive(Debug, Error)]
pub enum GeoClusterError {
    /// Record with missing, non-finite or out of range coordinates
    #[error("invalid point '{id}': {reason}")]
    InvalidPoint { id: String, reason: String },

    /// Cluster id that the index snapshot does not contain
    #[error("no cluster with id {0} in this index")]
    UnknownCluster(ClusterId),

    /// Fly-to target with a non-finite coordinate, zoom, pitch or bearing
    #[error("invalid fly-to target: {0}")]
    InvalidTarget(String),

    #[error("invalid gesture: {0}")]
    InvalidGesture(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for crate operations
pub type Result<T> = std::result::Result<T, GeoClusterError>;
