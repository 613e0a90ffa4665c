//! Geo point clustering for interactive maps
//!
//! A [`ClusterIndex`](cluster::ClusterIndex) is built once over a point set and
//! answers "what should be drawn at this zoom inside this box" queries. A
//! [`ViewportMachine`](viewport::ViewportMachine) owns the camera and animates
//! fly-to transitions, e.g. towards a cluster's expansion zoom.

pub mod cluster;
pub mod error;
pub mod viewport;

pub use error::{GeoClusterError, Result};
