use std::collections::BTreeMap;

use crate::mesh::Mesh;

/// An undirected edge derived from the face loops.
///
/// Edges are never stored on the mesh; they are recomputed from the face
/// list on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Lower position index of the pair.
    pub a: usize,
    /// Higher position index of the pair.
    pub b: usize,
    /// Ids of the faces whose loops traverse this edge.
    pub faces: Vec<usize>,
}

impl Edge {
    pub fn is_boundary(&self) -> bool {
        self.faces.len() == 1
    }
}

impl<const D: usize> Mesh<D> {
    /// Derives the edge set from the current face loops.
    ///
    /// Each consecutive corner pair within a loop contributes its unordered
    /// `(min, max)` position-index pair, so an edge walked by two faces with
    /// opposite winding merges into a single record carrying both face ids.
    /// Nothing is cached: every call recomputes from the face list, yields
    /// edges in ascending `(a, b)` order, and is idempotent under repetition.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + use<D> {
        let mut map: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
        for (face_id, face) in self.faces.iter().enumerate() {
            for i in 0..face.len() {
                let v0 = face[i].position;
                let v1 = face[(i + 1) % face.len()].position;
                // Zero-length edges carry no adjacency.
                if v0 == v1 {
                    continue;
                }
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                let faces = map.entry(key).or_default();
                if faces.last() != Some(&face_id) {
                    faces.push(face_id);
                }
            }
        }

        map.into_iter().map(|((a, b), faces)| Edge { a, b, faces })
    }

    /// Number of distinct derived edges.
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Corner, Mesh2};

    #[test]
    fn test_quad_edges() {
        let mut mesh = Mesh2::new();
        mesh.append(
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[],
            &[],
        )
        .unwrap();
        mesh.add_face(vec![
            Corner::new(0),
            Corner::new(1),
            Corner::new(2),
            Corner::new(3),
        ])
        .unwrap();

        let edges: Vec<Edge> = mesh.edges().collect();
        assert_eq!(edges.len(), 4);
        for edge in &edges {
            assert_eq!(edge.faces, vec![0]);
            assert!(edge.is_boundary());
        }
        let pairs: Vec<(usize, usize)> = edges.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_shared_edge_merges() {
        let mut mesh = Mesh2::new();
        mesh.append(
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[],
            &[],
        )
        .unwrap();
        // Two triangles sharing the diagonal 0-2 with opposite winding.
        mesh.add_face(vec![Corner::new(0), Corner::new(1), Corner::new(2)])
            .unwrap();
        mesh.add_face(vec![Corner::new(0), Corner::new(2), Corner::new(3)])
            .unwrap();

        let edges: Vec<Edge> = mesh.edges().collect();
        assert_eq!(edges.len(), 5);
        let diagonal = edges.iter().find(|e| (e.a, e.b) == (0, 2)).unwrap();
        assert_eq!(diagonal.faces, vec![0, 1]);
        assert!(!diagonal.is_boundary());

        // Recomputation is idempotent.
        assert_eq!(mesh.edge_count(), 5);
    }
}
