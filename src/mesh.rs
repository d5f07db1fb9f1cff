use crate::bounds::BoundingBox;
use crate::error::{GeomError, GeomResult};
use crate::index_buffer::IndexBuffer;
use crate::tree::SpatialTree;

/// One vertex-occurrence within a face loop.
///
/// A corner carries indices into the mesh's shared attribute buffers; the UV
/// and normal indices are optional. Two corners are attribute-identical iff
/// all present indices match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corner {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

impl Corner {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            uv: None,
            normal: None,
        }
    }

    pub fn with_uv(position: usize, uv: usize) -> Self {
        Self {
            position,
            uv: Some(uv),
            normal: None,
        }
    }

    pub fn with_uv_normal(position: usize, uv: usize, normal: usize) -> Self {
        Self {
            position,
            uv: Some(uv),
            normal: Some(normal),
        }
    }
}

/// A corner resolved through the attribute buffers into plain values.
///
/// This is the shape handed to rendering collaborators, which iterate faces
/// as value triples rather than raw indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex<const D: usize> {
    pub position: [f64; D],
    pub uv: Option<[f64; 2]>,
    pub normal: Option<[f64; 3]>,
}

/// An indexed mesh: one owned [`IndexBuffer`] plus an ordered list of faces,
/// each face an ordered winding loop of corners.
///
/// The buffer is exposed for loaders that fill it directly; face corner
/// indices are validated when a face is added and kept consistent by the weld
/// pass, so they are valid at query time unless the buffer is truncated
/// behind the mesh's back.
#[derive(Clone, Debug, Default)]
pub struct Mesh<const D: usize> {
    pub buffer: IndexBuffer<D>,
    pub(crate) faces: Vec<Vec<Corner>>,
}

/// A mesh over 2D positions.
pub type Mesh2 = Mesh<2>;
/// A mesh over 3D positions.
pub type Mesh3 = Mesh<3>;

impl<const D: usize> Mesh<D> {
    pub fn new() -> Self {
        Self {
            buffer: IndexBuffer::new(),
            faces: Vec::new(),
        }
    }

    /// Appends attribute data to the shared buffers. See
    /// [`IndexBuffer::append`].
    pub fn append(
        &mut self,
        positions: &[[f64; D]],
        uvs: &[[f64; 2]],
        normals: &[[f64; 3]],
    ) -> GeomResult<usize> {
        self.buffer.append(positions, uvs, normals)
    }

    /// Adds a face from an ordered corner loop and returns its id.
    ///
    /// Fails with `InvalidTopology` if the loop has fewer than three corners
    /// or any corner index falls outside the current buffers. A failed call
    /// leaves existing faces untouched.
    pub fn add_face(&mut self, corners: Vec<Corner>) -> GeomResult<usize> {
        if corners.len() < 3 {
            return Err(GeomError::InvalidTopology(format!(
                "face needs at least 3 corners, got {}",
                corners.len()
            )));
        }
        for corner in &corners {
            if corner.position >= self.buffer.position_count() {
                return Err(GeomError::InvalidTopology(format!(
                    "position index {} out of range ({} positions)",
                    corner.position,
                    self.buffer.position_count()
                )));
            }
            if let Some(uv) = corner.uv {
                if uv >= self.buffer.uv_count() {
                    return Err(GeomError::InvalidTopology(format!(
                        "uv index {} out of range ({} uvs)",
                        uv,
                        self.buffer.uv_count()
                    )));
                }
            }
            if let Some(normal) = corner.normal {
                if normal >= self.buffer.normal_count() {
                    return Err(GeomError::InvalidTopology(format!(
                        "normal index {} out of range ({} normals)",
                        normal,
                        self.buffer.normal_count()
                    )));
                }
            }
        }

        let id = self.faces.len();
        self.faces.push(corners);
        Ok(id)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// The raw corner loop of a face.
    pub fn face(&self, id: usize) -> Option<&[Corner]> {
        self.faces.get(id).map(|f| f.as_slice())
    }

    /// Iterates all faces as raw corner loops.
    pub fn faces(&self) -> impl Iterator<Item = &[Corner]> {
        self.faces.iter().map(|f| f.as_slice())
    }

    pub(crate) fn resolve(&self, corner: &Corner) -> Vertex<D> {
        Vertex {
            position: self.buffer.positions[corner.position],
            uv: corner.uv.map(|i| self.buffer.uvs[i]),
            normal: corner.normal.map(|i| self.buffer.normals[i]),
        }
    }

    /// Resolves one face's corners through the buffers into value triples.
    ///
    /// Checked access: a stale corner index (possible only if the buffer was
    /// truncated externally) reports `InvalidTopology` instead of panicking.
    pub fn face_vertices(&self, id: usize) -> GeomResult<Vec<Vertex<D>>> {
        let face = self
            .faces
            .get(id)
            .ok_or_else(|| GeomError::InvalidTopology(format!("no face with id {id}")))?;

        face.iter()
            .map(|corner| {
                let position = self
                    .buffer
                    .positions
                    .get(corner.position)
                    .copied()
                    .ok_or_else(|| {
                        GeomError::InvalidTopology(format!(
                            "stale position index {}",
                            corner.position
                        ))
                    })?;
                let uv = match corner.uv {
                    Some(i) => Some(self.buffer.uvs.get(i).copied().ok_or_else(|| {
                        GeomError::InvalidTopology(format!("stale uv index {i}"))
                    })?),
                    None => None,
                };
                let normal = match corner.normal {
                    Some(i) => Some(self.buffer.normals.get(i).copied().ok_or_else(|| {
                        GeomError::InvalidTopology(format!("stale normal index {i}"))
                    })?),
                    None => None,
                };
                Ok(Vertex {
                    position,
                    uv,
                    normal,
                })
            })
            .collect()
    }

    /// Iterates every corner of every face, resolved to values, in face order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex<D>> + '_ {
        self.faces
            .iter()
            .flat_map(move |face| face.iter().map(move |corner| self.resolve(corner)))
    }

    /// Tight bounding box over the position buffer, or `None` for an empty
    /// buffer.
    pub fn bounds(&self) -> Option<BoundingBox<D>> {
        BoundingBox::from_points(&self.buffer.positions)
    }

    /// Builds a spatial tree over the mesh's positions, payload = position
    /// index. The tree copies coordinates, so it stays valid while the mesh
    /// mutates but must be rebuilt to observe those mutations.
    pub fn vertex_tree(&self, capacity: usize, max_depth: usize) -> GeomResult<SpatialTree<D>> {
        SpatialTree::build(&self.buffer.positions, None, capacity, max_depth)
    }

    /// Replaces a face by its triangle fan about the face centroid.
    ///
    /// The centroid position (and the UV centroid, when every corner carries
    /// a UV; the averaged normal likewise) is appended to the buffers, and
    /// the face's slot in the face list is replaced by one triangle per
    /// original edge, preserving winding.
    pub fn subdivide_fan(&mut self, id: usize) -> GeomResult<()> {
        let face = self
            .faces
            .get(id)
            .ok_or_else(|| GeomError::InvalidTopology(format!("no face with id {id}")))?
            .clone();
        let n = face.len() as f64;

        let mut center = [0.0; D];
        for corner in &face {
            let p = self.buffer.positions[corner.position];
            for axis in 0..D {
                center[axis] += p[axis] / n;
            }
        }

        let uv_center = if face.iter().all(|c| c.uv.is_some()) {
            let mut uv = [0.0; 2];
            for i in face.iter().filter_map(|c| c.uv) {
                let t = self.buffer.uvs[i];
                uv[0] += t[0] / n;
                uv[1] += t[1] / n;
            }
            Some(uv)
        } else {
            None
        };

        let normal_center = if face.iter().all(|c| c.normal.is_some()) {
            let mut sum = [0.0; 3];
            for i in face.iter().filter_map(|c| c.normal) {
                let v = self.buffer.normals[i];
                for axis in 0..3 {
                    sum[axis] += v[axis];
                }
            }
            let mag = (sum[0] * sum[0] + sum[1] * sum[1] + sum[2] * sum[2]).sqrt();
            if mag > 0.0 {
                for axis in 0..3 {
                    sum[axis] /= mag;
                }
            }
            Some(sum)
        } else {
            None
        };

        let position = self.buffer.append(&[center], &[], &[])?;
        let uv = match uv_center {
            Some(uv) => {
                self.buffer.uvs.push(uv);
                Some(self.buffer.uv_count() - 1)
            }
            None => None,
        };
        let normal = match normal_center {
            Some(v) => {
                self.buffer.normals.push(v);
                Some(self.buffer.normal_count() - 1)
            }
            None => None,
        };
        let center_corner = Corner {
            position,
            uv,
            normal,
        };

        let fan: Vec<Vec<Corner>> = (0..face.len())
            .map(|i| vec![face[i], face[(i + 1) % face.len()], center_corner])
            .collect();
        self.faces.splice(id..id + 1, fan);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh2 {
        let mut mesh = Mesh2::new();
        mesh.append(
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[],
        )
        .unwrap();
        mesh.add_face(vec![
            Corner::with_uv(0, 0),
            Corner::with_uv(1, 1),
            Corner::with_uv(2, 2),
            Corner::with_uv(3, 3),
        ])
        .unwrap();
        mesh
    }

    #[test]
    fn test_add_face_validation() {
        let mut mesh = Mesh2::new();
        mesh.append(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], &[], &[])
            .unwrap();

        let result = mesh.add_face(vec![Corner::new(0), Corner::new(1)]);
        assert!(matches!(result, Err(GeomError::InvalidTopology(_))));

        let result = mesh.add_face(vec![Corner::new(0), Corner::new(1), Corner::new(3)]);
        assert!(matches!(result, Err(GeomError::InvalidTopology(_))));

        let result = mesh.add_face(vec![Corner::new(0), Corner::new(1), Corner::with_uv(2, 0)]);
        assert!(matches!(result, Err(GeomError::InvalidTopology(_))));

        assert_eq!(mesh.face_count(), 0);
        let id = mesh
            .add_face(vec![Corner::new(0), Corner::new(1), Corner::new(2)])
            .unwrap();
        assert_eq!(id, 0);
    }

    #[test]
    fn test_face_vertices_resolution() {
        let mesh = quad();
        let verts = mesh.face_vertices(0).unwrap();
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[2].position, [1.0, 1.0]);
        assert_eq!(verts[2].uv, Some([1.0, 1.0]));
        assert_eq!(verts[2].normal, None);
        assert_eq!(mesh.vertices().count(), 4);
    }

    #[test]
    fn test_subdivide_fan() {
        let mut mesh = quad();
        mesh.subdivide_fan(0).unwrap();
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.buffer.position_count(), 5);
        assert_eq!(mesh.buffer.positions[4], [0.5, 0.5]);
        assert_eq!(mesh.buffer.uvs[4], [0.5, 0.5]);
        for face in mesh.faces() {
            assert_eq!(face.len(), 3);
            assert_eq!(face[2].position, 4);
        }
    }

    #[test]
    fn test_bounds() {
        let mesh = quad();
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, [0.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0]);
        assert!(Mesh2::new().bounds().is_none());
    }
}
