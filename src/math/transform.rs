//! World/local placement of a surface.

use crate::core::types::{Affine3A, Quat, Vec3};

/// Placement of a grid in world space. Fixed for the lifetime of a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    local_to_world: Affine3A,
    world_to_local: Affine3A,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        local_to_world: Affine3A::IDENTITY,
        world_to_local: Affine3A::IDENTITY,
    };

    /// Build from a local-to-world affine transform
    pub fn new(local_to_world: Affine3A) -> Self {
        Self {
            local_to_world,
            world_to_local: local_to_world.inverse(),
        }
    }

    /// Build from translation, rotation and scale
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self::new(Affine3A::from_scale_rotation_translation(scale, rotation, translation))
    }

    /// Pure translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Affine3A::from_translation(translation))
    }

    pub fn local_to_world(&self) -> &Affine3A {
        &self.local_to_world
    }

    pub fn world_to_local(&self) -> &Affine3A {
        &self.world_to_local
    }

    /// Map a world-space point into grid-local space
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.world_to_local.transform_point3(world)
    }

    /// Map a grid-local point into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.local_to_world.transform_point3(local)
    }

    /// Map a grid-local direction into world space (normalized)
    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.local_to_world.transform_vector3(local).normalize_or_zero()
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_point() {
        let t = LocalTransform::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(10.0, -3.0, 5.0),
        );
        let p = Vec3::new(1.5, 0.25, -2.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn test_translation_inverse() {
        let t = LocalTransform::from_translation(Vec3::new(5.0, 1.0, 0.0));
        assert_eq!(t.inverse_transform_point(Vec3::new(7.0, 1.0, 2.0)), Vec3::new(2.0, 0.0, 2.0));
    }
}
