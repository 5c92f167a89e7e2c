//! Planar grid generation.
//!
//! A `width` x `height` cell grid has `(width + 1) * (height + 1)` vertices
//! laid out row-major in the local XZ plane, `index = y * (width + 1) + x`.
//! Each cell is split into two triangles that share the `v+1 <-> v+s` diagonal
//! and wind so the face normal points along +Y.

use crate::core::error::Error;
use crate::core::types::{Result, Vec2, Vec3};

/// Vertex positions, UVs and triangle list for a flat grid
#[derive(Clone, Debug)]
pub struct GridMesh {
    pub width: u32,
    pub height: u32,
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<u32>,
}

impl GridMesh {
    /// Generate a flat grid of `width` x `height` cells at y = 0
    pub fn generate(width: u32, height: u32) -> Result<Self> {
        check_size(width, height)?;

        // check_size guarantees every lattice index fits in u32
        let stride = width + 1;
        let vertex_count = vertex_count(width, height);

        let mut vertices = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        for y in 0..=height {
            for x in 0..=width {
                vertices.push(Vec3::new(x as f32, 0.0, y as f32));
                uvs.push(Vec2::new(x as f32 / width as f32, y as f32 / height as f32));
            }
        }

        let mut triangles = Vec::with_capacity(index_count(width, height));
        for y in 0..height {
            for x in 0..width {
                let v = y * stride + x;
                triangles.extend_from_slice(&[v, v + stride, v + 1]);
                triangles.extend_from_slice(&[v + 1, v + stride, v + stride + 1]);
            }
        }

        log::info!(
            "Generated {}x{} grid: {} vertices, {} triangles",
            width, height, vertices.len(), triangles.len() / 3
        );

        Ok(Self { width, height, vertices, uvs, triangles })
    }

    /// Row stride of the vertex lattice
    pub fn stride(&self) -> u32 {
        self.width + 1
    }

    /// Buffer index of lattice vertex (x, y)
    pub fn vertex_index(&self, x: u32, y: u32) -> usize {
        (y * self.stride() + x) as usize
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Reject grids that are empty or whose lattice cannot be indexed by `u32`
pub fn check_size(width: u32, height: u32) -> Result<()> {
    let indexable = (width as u64 + 1)
        .checked_mul(height as u64 + 1)
        .is_some_and(|count| count <= u32::MAX as u64 + 1);

    if width < 1 || height < 1 || !indexable {
        return Err(Error::InvalidGridSize { width, height });
    }
    Ok(())
}

/// Number of vertices in a `width` x `height` cell grid
pub fn vertex_count(width: u32, height: u32) -> usize {
    (width as usize + 1) * (height as usize + 1)
}

/// Number of triangle indices in a `width` x `height` cell grid
pub fn index_count(width: u32, height: u32) -> usize {
    width as usize * height as usize * 6
}
