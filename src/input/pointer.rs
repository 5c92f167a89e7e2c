//! Pointer presses turned into single-point indentations.

use crate::core::types::Vec3;
use crate::deform::batch::BatchId;
use crate::host::MarkerId;
use crate::markers::HitMarkers;
use crate::math::Ray;
use crate::surface::Deformable;

/// Outcome of a pointer press that hit the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerHit {
    pub batch: BatchId,
    /// World-space point the force was applied at
    pub point: Vec3,
    pub marker: Option<MarkerId>,
}

/// Routes pointer rays to the surface it was given
pub struct PointerInput<'a, D: Deformable + ?Sized> {
    target: &'a mut D,
    normal_offset: f32,
    markers: Option<&'a HitMarkers>,
}

impl<'a, D: Deformable + ?Sized> PointerInput<'a, D> {
    /// `normal_offset` lifts the hit point off the surface along the hit normal
    pub fn new(target: &'a mut D, normal_offset: f32) -> Self {
        Self {
            target,
            normal_offset,
            markers: None,
        }
    }

    /// Also drop a debug marker at each applied force
    pub fn with_markers(mut self, markers: &'a HitMarkers) -> Self {
        self.markers = Some(markers);
        self
    }

    /// Per-frame update: apply force while the button is held
    pub fn update(&mut self, button_down: bool, world_ray: &Ray) -> Option<PointerHit> {
        if !button_down {
            return None;
        }
        self.press(world_ray)
    }

    /// Raycast the surface and apply force at the (offset) hit point
    pub fn press(&mut self, world_ray: &Ray) -> Option<PointerHit> {
        let hit = self.target.raycast(world_ray)?;
        let point = hit.point + hit.normal * self.normal_offset;

        let batch = self.target.apply_force(point);
        let marker = self.markers.map(|m| m.spawn(point));

        log::debug!("Pointer hit at {} -> batch {}", point, batch);
        Some(PointerHit { batch, point, marker })
    }

    pub fn target(&self) -> &D {
        &*self.target
    }
}
