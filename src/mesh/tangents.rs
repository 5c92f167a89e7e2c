//! Per-vertex tangents for normal mapping.

use crate::core::types::{Vec2, Vec3, Vec4};

/// Compute tangents from positions, normals and UVs (Lengyel's method).
///
/// `w` holds the bitangent handedness (+1 or -1).
pub fn compute_tangents(
    vertices: &[Vec3],
    normals: &[Vec3],
    uvs: &[Vec2],
    triangles: &[u32],
) -> Vec<Vec4> {
    let mut tan = vec![Vec3::ZERO; vertices.len()];
    let mut bitan = vec![Vec3::ZERO; vertices.len()];

    for tri in triangles.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);

        let e1 = vertices[ib] - vertices[ia];
        let e2 = vertices[ic] - vertices[ia];
        let d1 = uvs[ib] - uvs[ia];
        let d2 = uvs[ic] - uvs[ia];

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for i in [ia, ib, ic] {
            tan[i] += sdir;
            bitan[i] += tdir;
        }
    }

    normals
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            // Gram-Schmidt against the normal
            let t = (tan[i] - n * n.dot(tan[i])).normalize_or_zero();
            let t = if t == Vec3::ZERO { n.any_orthonormal_vector() } else { t };
            let w = if n.cross(t).dot(bitan[i]) < 0.0 { -1.0 } else { 1.0 };
            t.extend(w)
        })
        .collect()
}
