//! Grid mesh generation and derived geometry

pub mod grid;
pub mod normals;
pub mod tangents;
pub mod collision;

pub use grid::GridMesh;
pub use normals::compute_normals;
pub use tangents::compute_tangents;
pub use collision::{CollisionShape, RayHit};
