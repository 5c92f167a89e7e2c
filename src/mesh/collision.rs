//! Read-only collision snapshot of the undeformed grid.
//!
//! Built once from the original flat geometry and never regenerated, so
//! indentations do not change collision response.

use std::sync::Arc;

use crate::core::types::Vec3;
use crate::math::{Aabb, Ray};
use super::grid::GridMesh;

/// Result of a ray cast against a collision shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the hit
    pub distance: f32,
    /// Hit position
    pub point: Vec3,
    /// Unit face normal of the hit triangle, facing against the ray
    pub normal: Vec3,
    /// Index of the hit triangle
    pub triangle: usize,
}

/// Immutable triangle soup used for collision queries
#[derive(Clone, Debug)]
pub struct CollisionShape {
    vertices: Arc<[Vec3]>,
    triangles: Arc<[u32]>,
    bounds: Aabb,
}

impl CollisionShape {
    /// Snapshot the grid's current (undeformed) geometry
    pub fn from_grid(grid: &GridMesh) -> Self {
        Self::new(grid.vertices.clone(), grid.triangles.clone())
    }

    pub fn new(vertices: Vec<Vec3>, triangles: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(&vertices).unwrap_or_default();
        Self {
            vertices: vertices.into(),
            triangles: triangles.into(),
            bounds,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Closest hit of a ray given in the shape's local space
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        // Flat shapes have a zero-thickness AABB; pad it for the slab test
        ray.intersects_aabb(&self.bounds.inflated(1e-3))?;

        let mut best: Option<RayHit> = None;
        for (triangle, tri) in self.triangles.chunks_exact(3).enumerate() {
            let a = self.vertices[tri[0] as usize];
            let b = self.vertices[tri[1] as usize];
            let c = self.vertices[tri[2] as usize];

            let Some(t) = ray.intersects_triangle(a, b, c) else {
                continue;
            };
            if best.is_some_and(|hit| hit.distance <= t) {
                continue;
            }

            let mut normal = (b - a).cross(c - a).normalize_or_zero();
            if normal.dot(ray.direction) > 0.0 {
                normal = -normal;
            }
            best = Some(RayHit {
                distance: t,
                point: ray.at(t),
                normal,
                triangle,
            });
        }
        best
    }
}
