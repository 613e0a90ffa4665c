//! Static 2-d tree over projected points
//!
//! The median split with pre-sorted dimensions follows Ethan Burns' kdtree
//! (New BSD License). The tree is built once and never modified.

use std::cmp::Ordering;

use super::point::{Point, inside};

/// KD-Tree for radius and rectangle queries
///
/// Points are separated from nodes. Nodes hold only indices into the points slice.
pub struct KDTree {
    /// All points in the tree
    pub points: Vec<Point>,
    /// Root node of the tree
    pub root: Option<Box<KDTreeNode>>,
}

/// A node in the K-D tree
pub struct KDTreeNode {
    /// Index of the point associated with this node
    pub point_id: usize,
    /// Indices of points equal to this node's point
    pub equal_ids: Vec<usize>,

    split: usize,
    left: Option<Box<KDTreeNode>>,
    right: Option<Box<KDTreeNode>>,
}

impl KDTree {
    /// Finds all points strictly closer than `dist` to the given point
    ///
    /// To avoid allocation, the `nodes` vector can be pre-allocated with a larger
    /// capacity and re-used across multiple calls.
    pub fn in_range(&self, pt: &Point, dist: f64, mut nodes: Vec<usize>) -> Vec<usize> {
        if dist < 0.0 {
            return nodes;
        }
        self.in_range_recursive(self.root.as_deref(), pt, dist * dist, &mut nodes);
        nodes
    }

    fn in_range_recursive(
        &self,
        t: Option<&KDTreeNode>,
        pt: &Point,
        r2: f64,
        nodes: &mut Vec<usize>,
    ) {
        let Some(t) = t else {
            return;
        };

        let node_pt = &self.points[t.point_id];
        let diff = pt.0[t.split] - node_pt.0[t.split];

        let (this_side, other_side) = if diff < 0.0 {
            (t.left.as_deref(), t.right.as_deref())
        } else {
            (t.right.as_deref(), t.left.as_deref())
        };

        self.in_range_recursive(this_side, pt, r2, nodes);
        // The splitting line is at least |diff| away, so the other side
        // can only hold matches when the line itself is within range
        if diff * diff <= r2 {
            if node_pt.sq_dist(pt) < r2 {
                nodes.push(t.point_id);
                nodes.extend_from_slice(&t.equal_ids);
            }
            self.in_range_recursive(other_side, pt, r2, nodes);
        }
    }

    /// Finds all points inside the `(min, max)` rectangle, edges inclusive
    pub fn range(&self, min: &Point, max: &Point) -> Vec<usize> {
        let mut nodes = Vec::new();
        self.range_recursive(self.root.as_deref(), min, max, &mut nodes);
        nodes
    }

    fn range_recursive(&self, t: Option<&KDTreeNode>, min: &Point, max: &Point, nodes: &mut Vec<usize>) {
        let Some(t) = t else {
            return;
        };

        let node_pt = &self.points[t.point_id];
        let pivot = node_pt.0[t.split];

        if inside(node_pt, min, max) {
            nodes.push(t.point_id);
            nodes.extend_from_slice(&t.equal_ids);
        }
        // Left holds values below the pivot, right holds values at or above it
        if min.0[t.split] < pivot {
            self.range_recursive(t.left.as_deref(), min, max, nodes);
        }
        if max.0[t.split] >= pivot {
            self.range_recursive(t.right.as_deref(), min, max, nodes);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the height of the K-D tree
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.height())
    }
}

impl KDTreeNode {
    fn height(&self) -> usize {
        let ht = self.left.as_ref().map_or(0, |l| l.height());
        let rht = self.right.as_ref().map_or(0, |r| r.height());
        ht.max(rht) + 1
    }
}

/// Creates a new K-D tree built from the given points
pub fn new_kd_tree(points: Vec<Point>) -> KDTree {
    let mut result = KDTree { points, root: None };

    if !result.points.is_empty() {
        result.root = build_tree(0, &result.points, &pre_sort(&result.points));
    }

    result
}

/// Builds a tree node by finding the median point and recursively building left and right subtrees
fn build_tree(depth: usize, points: &[Point], nodes: &PreSorted) -> Option<Box<KDTreeNode>> {
    let split = depth % 2;
    match nodes.cur[split].len() {
        0 => None,
        1 => Some(Box::new(KDTreeNode {
            point_id: nodes.cur[split][0],
            equal_ids: Vec::new(),
            split,
            left: None,
            right: None,
        })),
        _ => {
            let (med, equal, left, right) = nodes.split_med(points, split);
            Some(Box::new(KDTreeNode {
                point_id: med,
                equal_ids: equal,
                split,
                left: build_tree(depth + 1, points, &left),
                right: build_tree(depth + 1, points, &right),
            }))
        }
    }
}

/// Holds point ids pre-sorted on each dimension
struct PreSorted {
    cur: [Vec<usize>; 2],
}

fn cmp_on(points: &[Point], a: usize, b: usize, dim: usize) -> Ordering {
    points[a].0[dim]
        .total_cmp(&points[b].0[dim])
        .then_with(|| points[a].0[1 - dim].total_cmp(&points[b].0[1 - dim]))
}

/// Pre-sorts point ids on each dimension, ties broken by the other dimension
fn pre_sort(points: &[Point]) -> PreSorted {
    let mut cur = [Vec::new(), Vec::new()];
    for (dim, ids) in cur.iter_mut().enumerate() {
        *ids = (0..points.len()).collect();
        ids.sort_by(|&a, &b| cmp_on(points, a, b, dim));
    }
    PreSorted { cur }
}

impl PreSorted {
    /// Returns the median node on the split dimension, the ids of points equal to it
    /// and two PreSorted sets (still sorted on each dimension) holding the ids
    /// less than and greater than or equal to the median on that dimension.
    fn split_med(&self, points: &[Point], dim: usize) -> (usize, Vec<usize>, PreSorted, PreSorted) {
        let ids = &self.cur[dim];
        let mut m = ids.len() / 2;
        while m > 0 && points[ids[m - 1]].0[dim] == points[ids[m]].0[dim] {
            m -= 1;
        }
        let mut mh = m;
        while mh < ids.len() - 1 && points[ids[mh + 1]] == points[ids[m]] {
            mh += 1;
        }
        let med = ids[m];
        let equal = ids[m + 1..=mh].to_vec();
        let pivot = points[med].0[dim];

        let mut left = PreSorted {
            cur: [Vec::new(), Vec::new()],
        };
        left.cur[dim] = ids[..m].to_vec();

        let mut right = PreSorted {
            cur: [Vec::new(), Vec::new()],
        };
        right.cur[dim] = ids[mh + 1..].to_vec();

        let other = 1 - dim;
        left.cur[other] = Vec::with_capacity(m);
        right.cur[other] = Vec::with_capacity(ids.len() - mh);

        for &n in &self.cur[other] {
            // med and its duplicates are exactly the points equal to the median point
            if points[n] == points[med] {
                continue;
            }
            if points[n].0[dim] < pivot {
                left.cur[other].push(n);
            } else {
                right.cur[other].push(n);
            }
        }

        (med, equal, left, right)
    }
}
