//! Hierarchical spatial index over a fixed point set
//!
//! One level per integer zoom in `[min_zoom, max_zoom]`. The `max_zoom` level
//! holds a leaf per point; every level below is produced by merging the level
//! above it (see [`merge_level`]), and each level carries its own KD-tree.

use log::{debug, info, trace};

use super::aggregate::{ClusterId, merge_level};
use super::kdtree::{KDTree, new_kd_tree};
use super::options::ClusterOptions;
use super::point::{BoundingBox, GeoPoint, Point, RawRecord, wrap_longitude};
use super::projection::{lat_y, lng_x, project};
use crate::error::Result;

/// A leaf or an aggregate at one zoom level
#[derive(Debug, Clone, PartialEq)]
pub struct IndexNode {
    /// Position in the unit mercator square (weighted centroid for aggregates)
    pub point: Point,
    /// Number of points below this node
    pub count: usize,
    pub id: ClusterId,
    /// Aggregate that absorbed this node one zoom level lower
    pub parent: Option<ClusterId>,
    /// Positions of the merged nodes in the next higher zoom level; only set
    /// on the level where the aggregate was formed
    pub(crate) children: Vec<usize>,
    /// Position of the point in the index for leaves
    pub(crate) source: Option<usize>,
}

impl IndexNode {
    fn leaf(position: usize, point: Point) -> Self {
        IndexNode {
            point,
            count: 1,
            id: ClusterId(position as u64),
            parent: None,
            children: Vec::new(),
            source: Some(position),
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.source.is_none()
    }

    /// Copy of the node for the next lower zoom, where it survives unmerged
    pub(crate) fn carried(&self) -> Self {
        IndexNode {
            point: self.point,
            count: self.count,
            id: self.id,
            parent: None,
            children: Vec::new(),
            source: self.source,
        }
    }
}

/// Nodes of one zoom level and the KD-tree over their positions
pub struct ZoomLevel {
    pub zoom: u8,
    pub nodes: Vec<IndexNode>,
    pub(crate) tree: KDTree,
}

impl ZoomLevel {
    fn new(zoom: u8, nodes: Vec<IndexNode>) -> Self {
        let tree = new_kd_tree(nodes.iter().map(|n| n.point).collect());
        ZoomLevel { zoom, nodes, tree }
    }
}

/// ClusterIndex is the immutable, shareable spatial index
pub struct ClusterIndex {
    options: ClusterOptions,
    /// Points in canonical order: projected x, then y, then id
    points: Vec<GeoPoint>,
    /// `levels[i]` holds zoom `min_zoom + i`
    levels: Vec<ZoomLevel>,
}

impl ClusterIndex {
    /// Builds the index over `points`
    ///
    /// Points are put into a canonical order first, so the resulting partition
    /// does not depend on the order of the input sequence.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptions` if `options` do not validate.
    pub fn build(points: Vec<GeoPoint>, options: ClusterOptions) -> Result<Self> {
        options.validate()?;

        let mut keyed: Vec<(Point, GeoPoint)> = points
            .into_iter()
            .map(|p| (project(p.lng_lat()), p))
            .collect();
        keyed.sort_by(|(a, pa), (b, pb)| {
            a.0[0]
                .total_cmp(&b.0[0])
                .then_with(|| a.0[1].total_cmp(&b.0[1]))
                .then_with(|| pa.id().cmp(pb.id()))
        });
        let (projected, points): (Vec<Point>, Vec<GeoPoint>) = keyed.into_iter().unzip();

        let leaves = projected
            .iter()
            .enumerate()
            .map(|(i, p)| IndexNode::leaf(i, *p))
            .collect();

        let mut levels = Vec::with_capacity((options.max_zoom - options.min_zoom) as usize + 1);
        let mut current = ZoomLevel::new(options.max_zoom, leaves);

        // Cluster on the level just below max zoom, then cluster the results on
        // the previous zoom, etc.; results in a cluster hierarchy across zooms
        for zoom in (options.min_zoom..options.max_zoom).rev() {
            let (parents, coarser) = merge_level(&current, zoom, &options, points.len());
            for (node, parent) in current.nodes.iter_mut().zip(parents) {
                node.parent = parent;
            }
            trace!("zoom {}: {} nodes", zoom, coarser.len());
            levels.push(current);
            current = ZoomLevel::new(zoom, coarser);
        }
        levels.push(current);
        levels.reverse();

        info!(
            "Indexed {} points over zooms {}..={}",
            points.len(),
            options.min_zoom,
            options.max_zoom
        );

        Ok(ClusterIndex {
            options,
            points,
            levels,
        })
    }

    /// Builds the index from provider records, skipping the ones without
    /// usable coordinates
    pub fn from_records<I>(records: I, options: ClusterOptions) -> Result<Self>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut skipped = 0;
        let points = records
            .into_iter()
            .filter_map(|record| match record.into_point() {
                Ok(point) => Some(point),
                Err(e) => {
                    debug!("Skipping record: {}", e);
                    skipped += 1;
                    None
                }
            })
            .collect();
        if skipped > 0 {
            info!("Skipped {} records without usable coordinates", skipped);
        }
        Self::build(points, options)
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Indexed points in canonical order; leaf cluster ids are positions here
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Level holding integer zoom `zoom`, if it is within the indexed range
    pub fn level(&self, zoom: u8) -> Option<&ZoomLevel> {
        let i = zoom.checked_sub(self.options.min_zoom)?;
        self.levels.get(i as usize)
    }

    /// Returns the nodes at `zoom` whose position lies inside `bounds`
    ///
    /// Longitudes are wrapped, latitudes clamped, and a box crossing the
    /// antimeridian is answered as its two halves.
    pub fn query(&self, bounds: &BoundingBox, zoom: f64) -> Vec<&IndexNode> {
        if !bounds.is_finite() || !zoom.is_finite() {
            return Vec::new();
        }
        let Some(level) = self.level(self.options.level_for(zoom)) else {
            return Vec::new();
        };

        let min_lat = bounds.south.clamp(-90.0, 90.0);
        let max_lat = bounds.north.clamp(-90.0, 90.0);
        let min_lng = wrap_longitude(bounds.west);
        let max_lng = if bounds.east == 180.0 {
            180.0
        } else {
            wrap_longitude(bounds.east)
        };

        let spans = if bounds.east - bounds.west >= 360.0 {
            vec![(-180.0, 180.0)]
        } else if min_lng > max_lng {
            vec![(min_lng, 180.0), (-180.0, max_lng)]
        } else {
            vec![(min_lng, max_lng)]
        };

        spans
            .into_iter()
            .flat_map(|(west, east)| {
                level.tree.range(
                    &Point([lng_x(west), lat_y(max_lat)]),
                    &Point([lng_x(east), lat_y(min_lat)]),
                )
            })
            .map(|i| &level.nodes[i])
            .collect()
    }
}
