//! # voromesh
//!
//! `voromesh` is a Rust geometry kernel for indexed 2D/3D meshes, recursive
//! spatial-partition trees and nearest-seed Voronoi tessellation. It keeps a
//! consistent, queryable spatial index over large mutable point sets while
//! preserving per-corner attribute sharing in its meshes.
//!
//! ## Features
//!
//! - **Indexed Meshes**: shared position/UV/normal buffers referenced by
//!   per-face corner indices, with derived edges, tolerance-based vertex
//!   welding and fan subdivision.
//! - **Spatial Partitioning**: a dimension-generic quadtree/octree with
//!   region, radius and branch-and-bound nearest-neighbor queries.
//! - **Voronoi Tessellation**: nearest-seed classification over the tree,
//!   with parallel grid rasterization via `rayon`.
//!
//! ## Main Interface
//!
//! Meshes are populated through [`Mesh::append`] and [`Mesh::add_face`] (the
//! shape produced by parsing OBJ- or SVG-derived geometry, or by the
//! [`shapes`] constructors). [`SpatialTree`] is built over mesh vertices or
//! arbitrary point sets; [`Voronoi`] consumes a seed set and answers
//! [`Voronoi::cell_of`] queries.

mod bounds;
mod error;
mod index_buffer;
mod mesh;
mod mesh_edges;
mod mesh_weld;
pub mod shapes;
mod tree;
mod voronoi;

pub use bounds::BoundingBox;
pub use error::GeomError;
pub use error::GeomResult;
pub use index_buffer::IndexBuffer;
pub use mesh::Corner;
pub use mesh::Mesh;
pub use mesh::Mesh2;
pub use mesh::Mesh3;
pub use mesh::Vertex;
pub use mesh_edges::Edge;
pub use mesh_weld::WeldRemap;
pub use tree::NearestHit;
pub use tree::Octree;
pub use tree::Quadtree;
pub use tree::SpatialTree;
pub use voronoi::Voronoi;
pub use voronoi::Voronoi2;
pub use voronoi::Voronoi3;
