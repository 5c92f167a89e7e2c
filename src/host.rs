//! Capabilities the host engine provides.
//!
//! The deformation core only talks to these traits, never to concrete
//! renderer or physics types.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Vec3, Vec4};
use crate::deform::contact::ContactEvent;
use crate::math::Aabb;
use crate::mesh::collision::CollisionShape;

/// Opaque material reference passed through to the renderer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialHandle(pub u64);

/// Interleaved vertex layout for GPU upload
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 4],
}

/// Geometry pushed to the renderer
#[derive(Clone, Copy, Debug)]
pub struct MeshUpdate<'a> {
    pub vertices: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub uvs: &'a [Vec2],
    pub tangents: &'a [Vec4],
    pub triangles: &'a [u32],
    pub bounds: Aabb,
    pub material: MaterialHandle,
    /// False when only positions/normals/tangents changed
    pub topology_changed: bool,
}

impl MeshUpdate<'_> {
    /// Build the interleaved vertex array
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        (0..self.vertices.len())
            .map(|i| MeshVertex {
                position: self.vertices[i].to_array(),
                normal: self.normals[i].to_array(),
                uv: self.uvs[i].to_array(),
                tangent: self.tangents[i].to_array(),
            })
            .collect()
    }

    /// Raw position bytes
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }

    /// Raw index bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.triangles)
    }
}

/// Receives rendered geometry
pub trait MeshSink {
    fn update_mesh(&mut self, update: &MeshUpdate<'_>);
}

/// Receives the one-time collision shape
pub trait ColliderSink {
    fn set_collision_shape(&mut self, shape: CollisionShape);
}

/// Emits contact events detected by the physics collaborator
pub trait PhysicsSource {
    /// Next pending event, or `None` when drained for this tick
    fn poll_contact(&mut self) -> Option<ContactEvent>;
}

/// Identifier of a debug marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// Creates and destroys transient debug markers
pub trait MarkerSink: Send + Sync + 'static {
    fn spawn_marker(&self, id: MarkerId, world_position: Vec3);
    fn despawn_marker(&self, id: MarkerId);
}
