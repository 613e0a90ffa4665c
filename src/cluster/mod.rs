//! Zoom-dependent clustering of (lon, lat) points over a per-zoom K-D tree hierarchy
pub mod aggregate;
pub mod expansion;
pub mod index;
pub mod kdtree;
pub mod options;
pub mod point;
pub mod projection;

#[cfg(test)]
mod index_test;
#[cfg(test)]
mod point_test;
#[cfg(test)]
mod projection_test;

pub use aggregate::{
    Cluster, ClusterId, ClusterSnapshot, LatestClusters, children, get_clusters, leaves, snapshot,
};
pub use expansion::expansion_zoom;
pub use index::{ClusterIndex, IndexNode, ZoomLevel};
pub use kdtree::{KDTree, new_kd_tree};
pub use options::{ClusterOptions, MAX_SUPPORTED_ZOOM};
pub use point::{BoundingBox, GeoPoint, LngLat, Point, PointId, Properties, RawRecord};
pub use projection::{TILE_SIZE, project, unproject};
