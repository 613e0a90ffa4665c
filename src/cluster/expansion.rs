//! Zoom at which a clicked cluster comes apart

use log::debug;

use super::aggregate::{ClusterId, find_aggregate};
use super::index::ClusterIndex;
use crate::error::Result;

/// Returns the smallest zoom at which the cluster stops holding all of its
/// members in one aggregate
///
/// Clicking a cluster should fly the camera to this zoom. The value is clamped
/// to the index's configured `max_zoom`.
///
/// # Errors
///
/// Returns `UnknownCluster` if `id` is not an aggregate of this index. Ids are
/// tied to one index build; after a rebuild callers must re-query clusters.
pub fn expansion_zoom(index: &ClusterIndex, id: ClusterId) -> Result<u8> {
    let (zoom, _) = find_aggregate(index, id)?;
    // An aggregate always merges at least two nodes of the level above it,
    // so it is split one level deeper than the zoom it was formed at
    let expansion = (zoom + 1).min(index.options().max_zoom);
    debug!("Cluster {} expands at zoom {}", id, expansion);
    Ok(expansion)
}
