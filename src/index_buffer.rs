use crate::error::{GeomError, GeomResult};

/// Shared attribute storage for a mesh.
///
/// Positions, texture coordinates and normals live in parallel growable
/// buffers; faces reference them by plain integer index and never duplicate
/// attribute data per corner. The UV and normal buffers may stay empty when a
/// mesh carries no such attributes (normals are only meaningful for `D = 3`).
///
/// Buffers grow monotonically except during a weld pass, which may remap
/// indices and shrink the position buffer.
#[derive(Clone, Debug, Default)]
pub struct IndexBuffer<const D: usize> {
    pub positions: Vec<[f64; D]>,
    pub uvs: Vec<[f64; 2]>,
    pub normals: Vec<[f64; 3]>,
}

impl<const D: usize> IndexBuffer<D> {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
        }
    }

    pub fn with_capacity(positions: usize) -> Self {
        Self {
            positions: Vec::with_capacity(positions),
            uvs: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Appends attribute data and returns the index of the first newly added
    /// position.
    ///
    /// The only validation is a finite-number check on every component;
    /// non-finite input is rejected before anything is appended, so a failed
    /// call leaves the buffers untouched.
    pub fn append(
        &mut self,
        positions: &[[f64; D]],
        uvs: &[[f64; 2]],
        normals: &[[f64; 3]],
    ) -> GeomResult<usize> {
        let finite_pos = positions.iter().flatten().all(|v| v.is_finite());
        let finite_uv = uvs.iter().flatten().all(|v| v.is_finite());
        let finite_norm = normals.iter().flatten().all(|v| v.is_finite());
        if !finite_pos || !finite_uv || !finite_norm {
            return Err(GeomError::InvalidTopology(
                "non-finite attribute component".into(),
            ));
        }

        let base = self.positions.len();
        self.positions.extend_from_slice(positions);
        self.uvs.extend_from_slice(uvs);
        self.normals.extend_from_slice(normals);
        Ok(base)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn uv_count(&self) -> usize {
        self.uvs.len()
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_base_index() {
        let mut buffer = IndexBuffer::<2>::new();
        let base = buffer.append(&[[0.0, 0.0], [1.0, 0.0]], &[], &[]).unwrap();
        assert_eq!(base, 0);
        let base = buffer.append(&[[1.0, 1.0]], &[[0.5, 0.5]], &[]).unwrap();
        assert_eq!(base, 2);
        assert_eq!(buffer.position_count(), 3);
        assert_eq!(buffer.uv_count(), 1);
    }

    #[test]
    fn test_append_rejects_non_finite() {
        let mut buffer = IndexBuffer::<3>::new();
        let result = buffer.append(&[[0.0, f64::NAN, 0.0]], &[], &[]);
        assert!(matches!(result, Err(GeomError::InvalidTopology(_))));
        assert_eq!(buffer.position_count(), 0);

        let result = buffer.append(&[[0.0; 3]], &[], &[[f64::INFINITY, 0.0, 0.0]]);
        assert!(matches!(result, Err(GeomError::InvalidTopology(_))));
        assert_eq!(buffer.normal_count(), 0);
    }
}
