//! Contact adapter: world-space contact events to grid-local points.

use crate::core::types::Vec3;
use crate::math::LocalTransform;

/// A collision reported by the physics collaborator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactEvent {
    /// World-space contact positions
    pub world_points: Vec<Vec3>,
    /// Average contact normal, informational only
    pub normal_hint: Vec3,
}

impl ContactEvent {
    pub fn new(world_points: Vec<Vec3>, normal_hint: Vec3) -> Self {
        Self { world_points, normal_hint }
    }

    /// Single-point event
    pub fn point(world_point: Vec3) -> Self {
        Self::new(vec![world_point], Vec3::Y)
    }

    pub fn is_empty(&self) -> bool {
        self.world_points.is_empty()
    }
}

/// Transform world-space points into the grid's local space, preserving order
pub fn adapt(world_points: &[Vec3], transform: &LocalTransform) -> Vec<Vec3> {
    world_points
        .iter()
        .map(|&p| transform.inverse_transform_point(p))
        .collect()
}
