use rand::Rng;
use rayon::prelude::*;

use crate::bounds::BoundingBox;
use crate::error::{GeomError, GeomResult};
use crate::tree::{NearestHit, SpatialTree};

/// Leaf capacity for seed trees. Seed counts are typically small, so a low
/// capacity keeps the tree shallow and the nearest-seed descent short.
const SEED_CAPACITY: usize = 4;

/// Seed trees are depth-limited only as a termination guard for coincident
/// seeds.
const SEED_MAX_DEPTH: usize = 32;

/// A nearest-seed tessellation over a point set.
///
/// A Voronoi cell is precisely the set of sample points for which a given
/// seed is the nearest-neighbor result, so the tessellation is realized by
/// classification — repeated [`cell_of`](Voronoi::cell_of) sampling — rather
/// than by materializing cell boundary polygons.
///
/// The structure is read-only after construction; any change to the seed set
/// goes through [`rebuild`](Voronoi::rebuild), which replaces the tree
/// wholesale.
pub struct Voronoi<const D: usize> {
    seeds: Vec<([f64; D], usize)>,
    tree: SpatialTree<D>,
}

/// A tessellation over 2D seeds.
pub type Voronoi2 = Voronoi<2>;
/// A tessellation over 3D seeds.
pub type Voronoi3 = Voronoi<3>;

impl<const D: usize> Voronoi<D> {
    /// Builds the tessellation from a seed list of `(point, payload)` pairs.
    ///
    /// Fails with `EmptyTree` on an empty seed list and `OutOfBounds` on a
    /// non-finite seed coordinate.
    pub fn build(seeds: Vec<([f64; D], usize)>) -> GeomResult<Self> {
        let points: Vec<[f64; D]> = seeds.iter().map(|&(point, _)| point).collect();
        let bounds = BoundingBox::from_points(&points).ok_or(GeomError::EmptyTree)?;

        let mut tree = SpatialTree::new(bounds, SEED_CAPACITY, SEED_MAX_DEPTH);
        for &(point, payload) in &seeds {
            tree.insert(point, payload)?;
        }
        Ok(Self { seeds, tree })
    }

    /// Scatters `count` uniform random seeds over `bounds`, payload = seed
    /// index.
    pub fn scatter<R: Rng>(
        bounds: &BoundingBox<D>,
        count: usize,
        rng: &mut R,
    ) -> GeomResult<Self> {
        let mut seeds = Vec::with_capacity(count);
        for i in 0..count {
            let mut point = [0.0; D];
            for axis in 0..D {
                point[axis] = rng.gen_range(bounds.min[axis]..=bounds.max[axis]);
            }
            seeds.push((point, i));
        }
        Self::build(seeds)
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    pub fn seeds(&self) -> &[([f64; D], usize)] {
        &self.seeds
    }

    pub fn tree(&self) -> &SpatialTree<D> {
        &self.tree
    }

    /// The payload of the seed nearest to `sample` — the defining operation
    /// of the tessellation.
    ///
    /// Two seeds at identical coordinates tie; the tree's fixed traversal
    /// order resolves the tie to the first-inserted seed. That choice is
    /// seed-insertion-order-dependent, not geometrically meaningful.
    pub fn cell_of(&self, sample: &[f64; D]) -> GeomResult<usize> {
        Ok(self.tree.nearest(sample)?.payload)
    }

    /// Like [`cell_of`](Voronoi::cell_of), but also reports the seed point
    /// and its distance from the sample.
    pub fn nearest_seed(&self, sample: &[f64; D]) -> GeomResult<NearestHit<D>> {
        self.tree.nearest(sample)
    }

    /// Replaces the seed set and rebuilds the tree wholesale. There is no
    /// incremental seed add/remove.
    pub fn rebuild(&mut self, seeds: Vec<([f64; D], usize)>) -> GeomResult<()> {
        *self = Self::build(seeds)?;
        Ok(())
    }

    /// Classifies a regular grid of samples over `bounds`, one cell payload
    /// per sample, row-major with axis 0 fastest.
    ///
    /// Samples are taken at cell centers. Queries are read-only, so the grid
    /// is classified in parallel.
    pub fn rasterize(&self, bounds: &BoundingBox<D>, resolution: [usize; D]) -> GeomResult<Vec<usize>> {
        let total: usize = resolution.iter().product();
        (0..total)
            .into_par_iter()
            .map(|i| {
                let mut sample = [0.0; D];
                let mut rem = i;
                for axis in 0..D {
                    let cell = rem % resolution[axis];
                    rem /= resolution[axis];
                    let extent = bounds.max[axis] - bounds.min[axis];
                    sample[axis] =
                        bounds.min[axis] + (cell as f64 + 0.5) * extent / resolution[axis] as f64;
                }
                self.cell_of(&sample)
            })
            .collect()
    }
}
