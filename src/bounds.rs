/// Generic bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Computes the tight bounding box of a point set, or `None` if the set
    /// is empty.
    pub fn from_points(points: &[[f64; D]]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            for axis in 0..D {
                if p[axis] < min[axis] {
                    min[axis] = p[axis];
                }
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                }
            }
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> [f64; D] {
        let mut mid = [0.0; D];
        for axis in 0..D {
            mid[axis] = (self.min[axis] + self.max[axis]) * 0.5;
        }
        mid
    }

    pub fn extent(&self) -> [f64; D] {
        let mut size = [0.0; D];
        for axis in 0..D {
            size[axis] = self.max[axis] - self.min[axis];
        }
        size
    }

    /// Containment test, inclusive on all faces.
    pub fn contains(&self, point: &[f64; D]) -> bool {
        (0..D).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    pub fn intersects(&self, other: &BoundingBox<D>) -> bool {
        (0..D).all(|axis| self.max[axis] >= other.min[axis] && self.min[axis] <= other.max[axis])
    }

    /// Squared distance from a point to the box; zero when the point lies
    /// inside or on the boundary.
    pub fn dist_sq_to_point(&self, point: &[f64; D]) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..D {
            let d = (self.min[axis] - point[axis])
                .max(0.0)
                .max(point[axis] - self.max[axis]);
            d2 += d * d;
        }
        d2
    }
}
