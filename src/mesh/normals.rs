//! Area-weighted vertex normals.

use crate::core::types::Vec3;

/// Recompute per-vertex normals as the area-weighted average of adjacent
/// face normals. Vertices with no usable adjacent face get +Y.
pub fn compute_normals(vertices: &[Vec3], triangles: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in triangles.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        // Unnormalized cross product: length is twice the triangle area
        let face = (vertices[ib] - vertices[ia]).cross(vertices[ic] - vertices[ia]);
        normals[ia] += face;
        normals[ib] += face;
        normals[ic] += face;
    }

    for n in &mut normals {
        let unit = n.normalize_or_zero();
        *n = if unit == Vec3::ZERO { Vec3::Y } else { unit };
    }

    normals
}
