use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::bounds::BoundingBox;
use crate::error::{GeomError, GeomResult};

#[derive(Clone, Copy, Debug)]
struct TreePoint<const D: usize> {
    point: [f64; D],
    payload: usize,
}

/// A recursive spatial-partition tree over N-dimensional points.
///
/// Each node owns a bounding region and either holds points directly (a
/// leaf) or owns `2^D` children partitioning the region into equal
/// quadrants/octants. Point coordinates are copied into the tree together
/// with a caller-chosen `usize` payload, so the tree never aliases the
/// buffers it was built from.
///
/// A leaf pushed past `capacity` splits and redistributes its points, except
/// at `max_depth`, where it holds the overflow instead so insertion always
/// terminates — even for coincident points.
pub struct SpatialTree<const D: usize> {
    bounds: BoundingBox<D>,
    capacity: usize,
    max_depth: usize,
    level: usize,
    points: Vec<TreePoint<D>>,
    children: Option<Vec<SpatialTree<D>>>,
}

/// A spatial tree over 2D points.
pub type Quadtree = SpatialTree<2>;
/// A spatial tree over 3D points.
pub type Octree = SpatialTree<3>;

/// Result of a nearest-neighbor query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestHit<const D: usize> {
    pub point: [f64; D],
    pub payload: usize,
    pub distance: f64,
}

/// Index of the child octant owning `point`, given the region midpoint.
///
/// Per axis the upper child is chosen only for a strictly greater
/// coordinate, so a point exactly on a shared boundary always lands in the
/// lower-coordinate child. One deterministic owner per point.
fn child_index<const D: usize>(mid: &[f64; D], point: &[f64; D]) -> usize {
    let mut index = 0;
    for axis in 0..D {
        if point[axis] > mid[axis] {
            index |= 1 << axis;
        }
    }
    index
}

impl<const D: usize> SpatialTree<D> {
    /// Creates an empty tree with a fixed root region. The region is never
    /// auto-expanded; inserting outside it is an error.
    pub fn new(bounds: BoundingBox<D>, capacity: usize, max_depth: usize) -> Self {
        Self {
            bounds,
            capacity: capacity.max(1),
            max_depth,
            level: 0,
            points: Vec::new(),
            children: None,
        }
    }

    /// Bulk-builds a tree over `points`, payload = slice index.
    ///
    /// With `bounds: None` the tight bounding box of the points becomes the
    /// root region; that requires at least one point (`EmptyTree` otherwise).
    pub fn build(
        points: &[[f64; D]],
        bounds: Option<BoundingBox<D>>,
        capacity: usize,
        max_depth: usize,
    ) -> GeomResult<Self> {
        let bounds = match bounds {
            Some(bounds) => bounds,
            None => BoundingBox::from_points(points).ok_or(GeomError::EmptyTree)?,
        };
        let mut tree = Self::new(bounds, capacity, max_depth);
        for (i, point) in points.iter().enumerate() {
            tree.insert(*point, i)?;
        }
        Ok(tree)
    }

    pub fn bounds(&self) -> &BoundingBox<D> {
        &self.bounds
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Points held directly by this node. Internal nodes hold none.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Total number of points in the subtree.
    pub fn len(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(|child| child.len()).sum(),
            None => self.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.children {
            Some(children) => children.iter().all(|child| child.is_empty()),
            None => self.points.is_empty(),
        }
    }

    /// Removes all points and children, keeping the root region.
    pub fn clear(&mut self) {
        self.points.clear();
        self.children = None;
    }

    /// Inserts a point with its payload.
    ///
    /// Fails with `OutOfBounds` if the point is non-finite or lies outside
    /// the fixed root region; the caller must rebuild with an enlarged
    /// region to cover it.
    pub fn insert(&mut self, point: [f64; D], payload: usize) -> GeomResult<()> {
        if !point.iter().all(|v| v.is_finite()) {
            return Err(GeomError::OutOfBounds(format!(
                "non-finite point {point:?}"
            )));
        }
        if !self.bounds.contains(&point) {
            return Err(GeomError::OutOfBounds(format!(
                "point {point:?} outside root region {:?}..{:?}",
                self.bounds.min, self.bounds.max
            )));
        }
        self.insert_owned(point, payload);
        Ok(())
    }

    /// Descends to the owning leaf. The point is already known to be inside
    /// this node's region.
    fn insert_owned(&mut self, point: [f64; D], payload: usize) {
        let mid = self.bounds.center();
        match &mut self.children {
            Some(children) => {
                children[child_index(&mid, &point)].insert_owned(point, payload);
            }
            None => {
                self.points.push(TreePoint { point, payload });
                if self.points.len() > self.capacity && self.level < self.max_depth {
                    self.split();
                }
            }
        }
    }

    /// Splits this leaf into `2^D` equal sub-regions and redistributes its
    /// points; the node becomes internal and holds no points directly.
    fn split(&mut self) {
        let mid = self.bounds.center();
        let mut children = Vec::with_capacity(1 << D);
        for i in 0..1usize << D {
            let mut min = [0.0; D];
            let mut max = [0.0; D];
            for axis in 0..D {
                if i >> axis & 1 == 1 {
                    min[axis] = mid[axis];
                    max[axis] = self.bounds.max[axis];
                } else {
                    min[axis] = self.bounds.min[axis];
                    max[axis] = mid[axis];
                }
            }
            children.push(SpatialTree {
                bounds: BoundingBox::new(min, max),
                capacity: self.capacity,
                max_depth: self.max_depth,
                level: self.level + 1,
                points: Vec::new(),
                children: None,
            });
        }

        for p in std::mem::take(&mut self.points) {
            children[child_index(&mid, &p.point)].insert_owned(p.point, p.payload);
        }
        self.children = Some(children);
    }

    /// Returns all points whose position lies within `region`, inclusive on
    /// all faces.
    ///
    /// Only nodes whose region intersects `region` are visited. Output order
    /// is depth-first with children in fixed index order, so it is
    /// deterministic for a fixed tree.
    pub fn query_region(&self, region: &BoundingBox<D>) -> Vec<([f64; D], usize)> {
        let mut found = Vec::new();
        self.query_region_into(region, &mut found);
        found
    }

    fn query_region_into(&self, region: &BoundingBox<D>, found: &mut Vec<([f64; D], usize)>) {
        if !self.bounds.intersects(region) {
            return;
        }
        match &self.children {
            Some(children) => {
                for child in children {
                    child.query_region_into(region, found);
                }
            }
            None => {
                for p in &self.points {
                    if region.contains(&p.point) {
                        found.push((p.point, p.payload));
                    }
                }
            }
        }
    }

    /// Returns all points within `radius` of `center`, sorted by ascending
    /// distance; equal distances keep traversal order.
    pub fn query_radius(&self, center: &[f64; D], radius: f64) -> Vec<([f64; D], usize)> {
        let mut found = Vec::new();
        self.query_radius_into(center, radius * radius, &mut found);
        found.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        found.into_iter().map(|(_, point, payload)| (point, payload)).collect()
    }

    fn query_radius_into(
        &self,
        center: &[f64; D],
        radius_sq: f64,
        found: &mut Vec<(f64, [f64; D], usize)>,
    ) {
        if self.bounds.dist_sq_to_point(center) > radius_sq {
            return;
        }
        match &self.children {
            Some(children) => {
                for child in children {
                    child.query_radius_into(center, radius_sq, found);
                }
            }
            None => {
                for p in &self.points {
                    let d2 = dist_sq(&p.point, center);
                    if d2 <= radius_sq {
                        found.push((d2, p.point, p.payload));
                    }
                }
            }
        }
    }

    /// Branch-and-bound nearest-neighbor search.
    ///
    /// Best-first over a priority queue keyed on the region-to-point lower
    /// bound, so subtrees that cannot beat the current best are never
    /// expanded. Equal distances resolve to the candidate encountered first
    /// in the fixed traversal order. Fails with `EmptyTree` if no points
    /// were ever inserted.
    pub fn nearest(&self, point: &[f64; D]) -> GeomResult<NearestHit<D>> {
        let mut queue = BinaryHeap::new();
        let mut seq = 0u64;
        queue.push(SearchItem {
            dist_sq: self.bounds.dist_sq_to_point(point),
            seq,
            node: Some(self),
            point: None,
        });

        while let Some(item) = queue.pop() {
            if let Some(p) = item.point {
                return Ok(NearestHit {
                    point: p.point,
                    payload: p.payload,
                    distance: item.dist_sq.sqrt(),
                });
            }
            if let Some(node) = item.node {
                match &node.children {
                    Some(children) => {
                        for child in children {
                            seq += 1;
                            queue.push(SearchItem {
                                dist_sq: child.bounds.dist_sq_to_point(point),
                                seq,
                                node: Some(child),
                                point: None,
                            });
                        }
                    }
                    None => {
                        for p in &node.points {
                            seq += 1;
                            queue.push(SearchItem {
                                dist_sq: dist_sq(&p.point, point),
                                seq,
                                node: None,
                                point: Some(p),
                            });
                        }
                    }
                }
            }
        }
        Err(GeomError::EmptyTree)
    }

    /// Mean of all contained points. Fails with `EmptyTree` when the tree
    /// holds no points.
    pub fn center_mean(&self) -> GeomResult<[f64; D]> {
        let mut sum = [0.0; D];
        let mut count = 0usize;
        self.sum_points(&mut sum, &mut count);
        if count == 0 {
            return Err(GeomError::EmptyTree);
        }
        for axis in 0..D {
            sum[axis] /= count as f64;
        }
        Ok(sum)
    }

    fn sum_points(&self, sum: &mut [f64; D], count: &mut usize) {
        match &self.children {
            Some(children) => {
                for child in children {
                    child.sum_points(sum, count);
                }
            }
            None => {
                for p in &self.points {
                    for axis in 0..D {
                        sum[axis] += p.point[axis];
                    }
                }
                *count += self.points.len();
            }
        }
    }

    /// Leaf nodes of the subtree in depth-first order. Their regions tile
    /// this node's region exactly.
    pub fn leaves(&self) -> Vec<&SpatialTree<D>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SpatialTree<D>>) {
        match &self.children {
            Some(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            None => out.push(self),
        }
    }
}

fn dist_sq<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    let mut d2 = 0.0;
    for axis in 0..D {
        let d = a[axis] - b[axis];
        d2 += d * d;
    }
    d2
}

struct SearchItem<'a, const D: usize> {
    dist_sq: f64,
    seq: u64,
    node: Option<&'a SpatialTree<D>>,
    point: Option<&'a TreePoint<D>>,
}

impl<const D: usize> PartialEq for SearchItem<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        self.dist_sq == other.dist_sq && self.seq == other.seq
    }
}

impl<const D: usize> Eq for SearchItem<'_, D> {}

impl<const D: usize> PartialOrd for SearchItem<'_, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const D: usize> Ord for SearchItem<'_, D> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; equal distances pop in
        // push order so ties resolve to the first candidate encountered.
        other
            .dist_sq
            .partial_cmp(&self.dist_sq)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_split() {
        let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
        let mut tree = Quadtree::new(bounds, 2, 8);
        tree.insert([1.0, 1.0], 0).unwrap();
        tree.insert([9.0, 1.0], 1).unwrap();
        assert!(tree.is_leaf());

        tree.insert([9.0, 9.0], 2).unwrap();
        assert!(!tree.is_leaf());
        assert_eq!(tree.point_count(), 0);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let bounds = BoundingBox::new([0.0, 0.0], [1.0, 1.0]);
        let mut tree = Quadtree::new(bounds, 4, 8);
        assert!(matches!(
            tree.insert([2.0, 0.5], 0),
            Err(GeomError::OutOfBounds(_))
        ));
        assert!(matches!(
            tree.insert([f64::NAN, 0.5], 0),
            Err(GeomError::OutOfBounds(_))
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_boundary_point_has_one_owner() {
        let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
        let mut tree = Quadtree::new(bounds, 1, 8);
        // Force a split, then insert a point exactly on the shared boundary.
        tree.insert([1.0, 1.0], 0).unwrap();
        tree.insert([9.0, 9.0], 1).unwrap();
        tree.insert([5.0, 5.0], 2).unwrap();
        assert_eq!(tree.len(), 3);

        let leaf_total: usize = tree.leaves().iter().map(|leaf| leaf.point_count()).sum();
        assert_eq!(leaf_total, 3);

        // The midpoint belongs to the lower-coordinate child.
        let found = tree.query_region(&BoundingBox::new([0.0, 0.0], [5.0, 5.0]));
        assert!(found.iter().any(|&(_, payload)| payload == 2));
    }

    #[test]
    fn test_max_depth_overflow_leaf() {
        let bounds = BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut tree = Octree::new(bounds, 2, 3);
        // Coincident points can never be separated by splitting.
        for i in 0..16 {
            tree.insert([0.25, 0.25, 0.25], i).unwrap();
        }
        assert_eq!(tree.len(), 16);
        let deepest = tree.leaves().iter().map(|leaf| leaf.level).max().unwrap();
        assert_eq!(deepest, 3);
    }

    #[test]
    fn test_query_region_inclusive() {
        let bounds = BoundingBox::new([0.0, 0.0], [4.0, 4.0]);
        let mut tree = Quadtree::new(bounds, 1, 8);
        tree.insert([1.0, 1.0], 0).unwrap();
        tree.insert([2.0, 2.0], 1).unwrap();
        tree.insert([3.0, 3.0], 2).unwrap();

        let found = tree.query_region(&BoundingBox::new([1.0, 1.0], [2.0, 2.0]));
        let payloads: Vec<usize> = found.iter().map(|&(_, payload)| payload).collect();
        assert_eq!(payloads, vec![0, 1]);
    }

    #[test]
    fn test_nearest() {
        let points = [[1.0, 1.0], [4.0, 4.0], [8.0, 1.0]];
        let tree = Quadtree::build(&points, None, 1, 8).unwrap();

        let hit = tree.nearest(&[7.0, 2.0]).unwrap();
        assert_eq!(hit.payload, 2);
        assert!((hit.distance - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_tie_takes_first_inserted() {
        let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
        let mut tree = Quadtree::new(bounds, 4, 8);
        tree.insert([3.0, 3.0], 7).unwrap();
        tree.insert([3.0, 3.0], 9).unwrap();
        let hit = tree.nearest(&[3.0, 3.0]).unwrap();
        assert_eq!(hit.payload, 7);
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_nearest_empty_tree() {
        let tree = Octree::new(BoundingBox::new([0.0; 3], [1.0; 3]), 4, 8);
        assert!(matches!(tree.nearest(&[0.5; 3]), Err(GeomError::EmptyTree)));
    }

    #[test]
    fn test_query_radius_sorted() {
        let points = [[0.0, 0.0], [3.0, 0.0], [1.0, 0.0], [9.0, 0.0]];
        let tree = Quadtree::build(&points, None, 2, 8).unwrap();
        let found = tree.query_radius(&[0.0, 0.0], 3.5);
        let payloads: Vec<usize> = found.iter().map(|&(_, payload)| payload).collect();
        assert_eq!(payloads, vec![0, 2, 1]);
    }

    #[test]
    fn test_center_mean() {
        let points = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        let tree = Quadtree::build(&points, None, 1, 8).unwrap();
        assert_eq!(tree.center_mean().unwrap(), [1.0, 1.0]);

        let empty = Quadtree::new(BoundingBox::new([0.0; 2], [1.0; 2]), 4, 8);
        assert!(matches!(empty.center_mean(), Err(GeomError::EmptyTree)));
    }
}
