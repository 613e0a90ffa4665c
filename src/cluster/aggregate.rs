//! Cluster aggregation: merging nodes per zoom and answering viewport queries

use std::fmt;

use bitvec::prelude::*;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::index::{ClusterIndex, IndexNode, ZoomLevel};
use super::options::ClusterOptions;
use super::point::{BoundingBox, GeoPoint, LngLat, Point, PointId, Properties};
use super::projection::{pixels_to_world, unproject};
use crate::error::{GeoClusterError, Result};
use crate::viewport::ViewportMachine;

/// Stable cluster identifier
///
/// Leaves use the point's position in the index. Aggregates encode the zoom
/// they were formed at and their position within that zoom level, offset by
/// the number of points:
/// `(position << 5) + (zoom + 1) + point_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ClusterId {
    pub(crate) fn aggregate(position: usize, zoom: u8, point_count: usize) -> Self {
        ClusterId(((position as u64) << 5) + (zoom as u64 + 1) + point_count as u64)
    }

    /// Returns `(origin zoom, position)` of an aggregate id, or `None` for
    /// leaf ids and values no aggregate could carry
    pub(crate) fn decode(self, point_count: usize) -> Option<(u8, usize)> {
        let v = self.0.checked_sub(point_count as u64)?;
        let zoom_plus_one = (v % 32) as u8;
        if zoom_plus_one == 0 {
            return None;
        }
        Some((zoom_plus_one - 1, (v >> 5) as usize))
    }
}

/// Cluster is one rendered marker: an aggregate or a single point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub centroid: LngLat,
    pub is_aggregate: bool,
    /// 1 if not aggregate
    pub point_count: usize,
    /// Source point id, only for non-aggregates
    pub point_id: Option<PointId>,
    /// Source point properties, only for non-aggregates
    pub properties: Option<Properties>,
}

impl Cluster {
    fn from_node(index: &ClusterIndex, node: &IndexNode) -> Self {
        match node.source {
            Some(position) => {
                let point = &index.points()[position];
                Cluster {
                    id: node.id,
                    centroid: point.lng_lat(),
                    is_aggregate: false,
                    point_count: 1,
                    point_id: Some(point.id().clone()),
                    properties: Some(point.properties().clone()),
                }
            }
            None => Cluster {
                id: node.id,
                centroid: unproject(&node.point),
                is_aggregate: true,
                point_count: node.count,
                point_id: None,
                properties: None,
            },
        }
    }

    /// Short count label for a cluster marker: `"999"`, `"1.2k"`, `"15k"`
    pub fn abbreviated_count(&self) -> String {
        let count = self.point_count as f64;
        if self.point_count >= 10_000 {
            format!("{}k", (count / 1000.0).round())
        } else if self.point_count >= 1000 {
            format!("{}k", (count / 100.0).round() / 10.0)
        } else {
            self.point_count.to_string()
        }
    }
}

/// Merges the nodes of `level` (zoom `zoom + 1`) into the nodes of `zoom`
///
/// Nodes are visited in level order. An unvisited node takes every unvisited
/// neighbour closer than `radius` pixels at `zoom`; if that yields at least
/// `min_points` points an aggregate is formed at the count-weighted centroid,
/// otherwise the node and its neighbours are carried down unchanged.
///
/// # Returns
///
/// A tuple `(parents, next)` where:
/// - `parents[i]` is the aggregate that absorbed `level.nodes[i]`, if any
/// - `next` is the list of nodes for `zoom`
pub(crate) fn merge_level(
    level: &ZoomLevel,
    zoom: u8,
    options: &ClusterOptions,
    point_count: usize,
) -> (Vec<Option<ClusterId>>, Vec<IndexNode>) {
    let nodes = &level.nodes;
    let r = pixels_to_world(options.radius, zoom as f64);
    let mut visited = bitvec![0; nodes.len()];
    let mut parents = vec![None; nodes.len()];
    let mut next = Vec::new();
    let mut neighbors = Vec::new();

    for i in 0..nodes.len() {
        if visited[i] {
            continue;
        }
        visited.set(i, true);
        let node = &nodes[i];

        neighbors.clear();
        neighbors = level.tree.in_range(&node.point, r, neighbors);
        neighbors.retain(|&k| !visited[k]);
        neighbors.sort_unstable();

        let count = node.count + neighbors.iter().map(|&k| nodes[k].count).sum::<usize>();

        if !neighbors.is_empty() && count >= options.min_points {
            let id = ClusterId::aggregate(next.len(), zoom, point_count);
            let mut wx = node.point.0[0] * node.count as f64;
            let mut wy = node.point.0[1] * node.count as f64;
            let mut children = Vec::with_capacity(neighbors.len() + 1);
            children.push(i);
            parents[i] = Some(id);

            for &k in &neighbors {
                visited.set(k, true);
                let n = &nodes[k];
                wx += n.point.0[0] * n.count as f64;
                wy += n.point.0[1] * n.count as f64;
                parents[k] = Some(id);
                children.push(k);
            }
            children.sort_unstable();

            next.push(IndexNode {
                point: Point([wx / count as f64, wy / count as f64]),
                count,
                id,
                parent: None,
                children,
                source: None,
            });
        } else {
            next.push(node.carried());
            for &k in &neighbors {
                visited.set(k, true);
                next.push(nodes[k].carried());
            }
        }
    }

    (parents, next)
}

/// Returns the clusters and single points to draw at `zoom` inside `bounds`
///
/// `None` bounds means no map surface is attached yet; the result is empty.
/// The result is a fresh snapshot and a pure function of its inputs.
pub fn get_clusters(index: &ClusterIndex, zoom: f64, bounds: Option<&BoundingBox>) -> Vec<Cluster> {
    let Some(bounds) = bounds else {
        trace!("No bounds yet, nothing to cluster");
        return Vec::new();
    };
    if !zoom.is_finite() || !bounds.is_finite() {
        warn!("Ignoring cluster query with zoom {} and bounds {:?}", zoom, bounds);
        return Vec::new();
    }

    let clusters: Vec<Cluster> = index
        .query(bounds, zoom)
        .into_iter()
        .map(|node| Cluster::from_node(index, node))
        .collect();
    trace!("zoom {:.2}: {} clusters", zoom, clusters.len());
    clusters
}

/// Looks up an aggregate by id on the level it was formed at
///
/// # Errors
///
/// Returns `UnknownCluster` for leaf ids and ids that this index never produced.
pub(crate) fn find_aggregate(index: &ClusterIndex, id: ClusterId) -> Result<(u8, &IndexNode)> {
    let (zoom, position) = id
        .decode(index.len())
        .ok_or(GeoClusterError::UnknownCluster(id))?;
    let node = index
        .level(zoom)
        .and_then(|level| level.nodes.get(position))
        .filter(|node| node.id == id && node.is_aggregate())
        .ok_or(GeoClusterError::UnknownCluster(id))?;
    Ok((zoom, node))
}

/// Returns the clusters an aggregate splits into one zoom level deeper
pub fn children(index: &ClusterIndex, id: ClusterId) -> Result<Vec<Cluster>> {
    let (zoom, node) = find_aggregate(index, id)?;
    let level = index
        .level(zoom + 1)
        .ok_or(GeoClusterError::UnknownCluster(id))?;
    Ok(node
        .children
        .iter()
        .map(|&k| Cluster::from_node(index, &level.nodes[k]))
        .collect())
}

/// Returns up to `limit` original points under an aggregate, skipping the first `offset`
pub fn leaves(
    index: &ClusterIndex,
    id: ClusterId,
    limit: usize,
    offset: usize,
) -> Result<Vec<&GeoPoint>> {
    let (zoom, node) = find_aggregate(index, id)?;
    let mut result = Vec::new();
    let mut skipped = 0;
    append_leaves(index, zoom, node, limit, offset, &mut skipped, &mut result);
    Ok(result)
}

fn append_leaves<'a>(
    index: &'a ClusterIndex,
    zoom: u8,
    node: &IndexNode,
    limit: usize,
    offset: usize,
    skipped: &mut usize,
    result: &mut Vec<&'a GeoPoint>,
) {
    let Some(level) = index.level(zoom + 1) else {
        return;
    };
    for &k in &node.children {
        if result.len() >= limit {
            return;
        }
        let child = &level.nodes[k];
        if let Some(position) = child.source {
            if *skipped < offset {
                *skipped += 1;
            } else {
                result.push(&index.points()[position]);
            }
        } else if *skipped + child.count <= offset {
            // Skip the whole cluster
            *skipped += child.count;
        } else if let Ok((origin, origin_node)) = find_aggregate(index, child.id) {
            append_leaves(index, origin, origin_node, limit, offset, skipped, result);
        }
    }
}

/// Cluster query result tagged with the viewport generation it was computed for
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSnapshot {
    pub generation: u64,
    pub zoom: f64,
    pub clusters: Vec<Cluster>,
}

/// Runs [`get_clusters`] for the machine's current camera
pub fn snapshot(
    index: &ClusterIndex,
    viewport: &ViewportMachine,
    bounds: Option<&BoundingBox>,
) -> ClusterSnapshot {
    let zoom = viewport.state().zoom;
    ClusterSnapshot {
        generation: viewport.generation(),
        zoom,
        clusters: get_clusters(index, zoom, bounds),
    }
}

/// Holds the most recent cluster snapshot; older generations are discarded
#[derive(Debug, Default)]
pub struct LatestClusters {
    current: Option<ClusterSnapshot>,
}

impl LatestClusters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `snapshot` unless a newer generation is already held
    pub fn offer(&mut self, snapshot: ClusterSnapshot) -> bool {
        if let Some(current) = &self.current
            && snapshot.generation < current.generation
        {
            debug!(
                "Discarding stale clusters for generation {} (have {})",
                snapshot.generation, current.generation
            );
            return false;
        }
        self.current = Some(snapshot);
        true
    }

    pub fn generation(&self) -> Option<u64> {
        self.current.as_ref().map(|s| s.generation)
    }

    pub fn clusters(&self) -> &[Cluster] {
        self.current.as_ref().map_or(&[], |s| s.clusters.as_slice())
    }
}
