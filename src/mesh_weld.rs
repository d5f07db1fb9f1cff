use std::collections::HashMap;

use crate::error::{GeomError, GeomResult};
use crate::mesh::Mesh;

/// Old-to-new position index mapping produced by a weld pass.
///
/// Callers holding external references keyed by old position indices (a
/// parser's vertex table, material assignments) rewrite them through this
/// table after welding.
#[derive(Clone, Debug)]
pub struct WeldRemap {
    map: Vec<usize>,
    /// Number of positions merged away into a representative.
    pub merged: usize,
    /// Number of faces dropped because their corners collapsed below three
    /// distinct positions.
    pub dropped_faces: usize,
}

impl WeldRemap {
    /// The new index for an old position index, or `None` if the old index
    /// was out of range before the weld.
    pub fn new_index(&self, old: usize) -> Option<usize> {
        self.map.get(old).copied()
    }

    /// Number of pre-weld positions covered by the table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.map
    }
}

impl<const D: usize> Mesh<D> {
    /// Merges positions that quantize to the same grid cell of size
    /// `tolerance` into one canonical index, then compacts the position
    /// buffer.
    ///
    /// Each position is keyed by component-wise `floor(p / tolerance)`. The
    /// representative of a group is the lowest original index — index order,
    /// not insertion time — which makes the operation deterministic and
    /// idempotent: welding an already-welded mesh at the same tolerance is a
    /// no-op. Face corner position indices are rewritten through the
    /// resulting remap; positions left without a group to represent are
    /// dropped from the buffer. UV and normal buffers are untouched.
    ///
    /// Faces whose corners collapse to fewer than three distinct positions
    /// are removed from the face list rather than left dangling. That drop is
    /// not an error; it is reported in the returned [`WeldRemap`] and logged
    /// as a count.
    pub fn weld_by_distance(&mut self, tolerance: f64) -> GeomResult<WeldRemap> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(GeomError::InvalidTopology(format!(
                "weld tolerance must be finite and positive, got {tolerance}"
            )));
        }

        let old_len = self.buffer.positions.len();
        let mut groups: HashMap<[i64; D], usize> = HashMap::with_capacity(old_len);
        let mut rep = vec![0usize; old_len];
        for (i, p) in self.buffer.positions.iter().enumerate() {
            let mut key = [0i64; D];
            for axis in 0..D {
                key[axis] = (p[axis] / tolerance).floor() as i64;
            }
            rep[i] = *groups.entry(key).or_insert(i);
        }

        // Representatives keep their buffer slot, in ascending index order;
        // everything else follows its representative.
        let mut map = vec![0usize; old_len];
        let mut compacted = Vec::new();
        for i in 0..old_len {
            if rep[i] == i {
                map[i] = compacted.len();
                compacted.push(self.buffer.positions[i]);
            } else {
                map[i] = map[rep[i]];
            }
        }

        let mut dropped_faces = 0usize;
        self.faces.retain_mut(|face| {
            for corner in face.iter_mut() {
                corner.position = map[corner.position];
            }
            let mut distinct: Vec<usize> = face.iter().map(|c| c.position).collect();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() < 3 {
                dropped_faces += 1;
                false
            } else {
                true
            }
        });

        let merged = old_len - compacted.len();
        self.buffer.positions = compacted;
        log::debug!(
            "weld: merged {merged} of {old_len} positions, dropped {dropped_faces} degenerate faces"
        );

        Ok(WeldRemap {
            map,
            merged,
            dropped_faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Corner, Mesh2};

    #[test]
    fn test_weld_merges_coincident_positions() {
        let mut mesh = Mesh2::new();
        // Two triangles sharing an edge, written with duplicated positions.
        mesh.append(
            &[
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 0.0001],
                [1.0, 1.0001],
                [0.0, 1.0],
            ],
            &[],
            &[],
        )
        .unwrap();
        mesh.add_face(vec![Corner::new(0), Corner::new(1), Corner::new(2)])
            .unwrap();
        mesh.add_face(vec![Corner::new(3), Corner::new(4), Corner::new(5)])
            .unwrap();

        let remap = mesh.weld_by_distance(0.01).unwrap();
        assert_eq!(remap.merged, 2);
        assert_eq!(remap.dropped_faces, 0);
        assert_eq!(mesh.buffer.position_count(), 4);
        assert_eq!(remap.new_index(3), remap.new_index(0));
        assert_eq!(remap.new_index(4), remap.new_index(2));

        // The shared diagonal is now a single merged edge.
        let shared: Vec<_> = mesh.edges().filter(|e| e.faces.len() == 2).collect();
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn test_weld_drops_degenerate_faces() {
        let mut mesh = Mesh2::new();
        mesh.append(
            &[[0.0, 0.0], [0.001, 0.001], [1.0, 1.0], [5.0, 5.0], [6.0, 5.0], [5.0, 6.0]],
            &[],
            &[],
        )
        .unwrap();
        // Collapses: corners 0 and 1 weld together, leaving 2 distinct positions.
        mesh.add_face(vec![Corner::new(0), Corner::new(1), Corner::new(2)])
            .unwrap();
        mesh.add_face(vec![Corner::new(3), Corner::new(4), Corner::new(5)])
            .unwrap();

        let remap = mesh.weld_by_distance(0.01).unwrap();
        assert_eq!(remap.dropped_faces, 1);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_weld_rejects_bad_tolerance() {
        let mut mesh = Mesh2::new();
        assert!(matches!(
            mesh.weld_by_distance(0.0),
            Err(GeomError::InvalidTopology(_))
        ));
        assert!(matches!(
            mesh.weld_by_distance(f64::NAN),
            Err(GeomError::InvalidTopology(_))
        ));
    }
}
