//! Procedural mesh constructors.
//!
//! These fill a mesh the same way a format parser would — flat attribute
//! data through `append`, then corner-index loops through `add_face` — and
//! double as deterministic fixtures for tests and benches.

use std::f64::consts::TAU;

use crate::error::{GeomError, GeomResult};
use crate::mesh::{Corner, Mesh2, Mesh3};

/// An equilateral triangle inscribed in a radius-0.5 circle, centered on the
/// origin, with UVs.
pub fn triangle() -> GeomResult<Mesh2> {
    let mut mesh = Mesh2::new();
    mesh.append(
        &[[0.0, 0.5], [-0.433_012_7, -0.25], [0.433_012_7, -0.25]],
        &[[0.5, 0.0], [0.066_987_3, 0.75], [0.933_012_7, 0.75]],
        &[],
    )?;
    mesh.add_face(vec![
        Corner::with_uv(0, 0),
        Corner::with_uv(1, 1),
        Corner::with_uv(2, 2),
    ])?;
    Ok(mesh)
}

/// A unit square centered on the origin as a single quad face, with UVs.
pub fn rectangle() -> GeomResult<Mesh2> {
    let mut mesh = Mesh2::new();
    mesh.append(
        &[[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]],
        &[[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        &[],
    )?;
    mesh.add_face(vec![
        Corner::with_uv(0, 0),
        Corner::with_uv(1, 1),
        Corner::with_uv(2, 2),
        Corner::with_uv(3, 3),
    ])?;
    Ok(mesh)
}

/// A regular polygon inscribed in a radius-0.5 circle as one n-gon face,
/// counter-clockwise winding, with UVs.
///
/// Fails with `InvalidTopology` for fewer than three sectors.
pub fn polygon(sectors: usize) -> GeomResult<Mesh2> {
    if sectors < 3 {
        return Err(GeomError::InvalidTopology(format!(
            "polygon needs at least 3 sectors, got {sectors}"
        )));
    }

    let mut positions = Vec::with_capacity(sectors);
    let mut uvs = Vec::with_capacity(sectors);
    for i in 0..sectors {
        let theta = TAU * i as f64 / sectors as f64;
        let (sin, cos) = theta.sin_cos();
        positions.push([0.5 * cos, 0.5 * sin]);
        uvs.push([0.5 + 0.5 * cos, 0.5 - 0.5 * sin]);
    }

    let mut mesh = Mesh2::new();
    mesh.append(&positions, &uvs, &[])?;
    mesh.add_face((0..sectors).map(|i| Corner::with_uv(i, i)).collect())?;
    Ok(mesh)
}

/// A unit cube centered on the origin: 8 shared positions, 4 shared UVs, one
/// outward normal per face, 6 quad faces wound counter-clockwise seen from
/// outside.
pub fn cube() -> GeomResult<Mesh3> {
    let mut mesh = Mesh3::new();
    mesh.append(
        &[
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ],
        &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        &[
            [0.0, 0.0, -1.0],
            [0.0, 0.0, 1.0],
            [0.0, -1.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        ],
    )?;

    let loops: [[usize; 4]; 6] = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ];
    for (normal, positions) in loops.iter().enumerate() {
        mesh.add_face(
            positions
                .iter()
                .enumerate()
                .map(|(uv, &position)| Corner::with_uv_normal(position, uv, normal))
                .collect(),
        )?;
    }
    Ok(mesh)
}
