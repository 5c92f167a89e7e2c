//! Deformable surface: a grid mesh indented by contacts.
//!
//! Owns the generated grid, the batch scheduler and the derived render
//! geometry. The tick driver calls [`DeformableSurface::tick`] once per
//! simulation step before anything else reads the vertices for that step.

use crate::core::config::SurfaceConfig;
use crate::core::types::{Result, Vec3, Vec4};
use crate::deform::batch::BatchId;
use crate::deform::contact::{adapt, ContactEvent};
use crate::deform::scheduler::{BatchScheduler, PumpReport};
use crate::host::{ColliderSink, MeshSink, MeshUpdate, PhysicsSource};
use crate::math::{Aabb, LocalTransform, Ray};
use crate::mesh::collision::{CollisionShape, RayHit};
use crate::mesh::grid::GridMesh;
use crate::mesh::normals::compute_normals;
use crate::mesh::tangents::compute_tangents;

/// What input collaborators need from a surface
pub trait Deformable {
    /// Queue a single-point indentation at a world-space position
    fn apply_force(&mut self, world_point: Vec3) -> BatchId;

    /// Cast a world-space ray against the surface's collision shape
    fn raycast(&self, world_ray: &Ray) -> Option<RayHit>;
}

/// A grid surface that deforms under contact
pub struct DeformableSurface<M: MeshSink> {
    config: SurfaceConfig,
    transform: LocalTransform,
    grid: GridMesh,
    collision: CollisionShape,
    scheduler: BatchScheduler,
    normals: Vec<Vec3>,
    tangents: Vec<Vec4>,
    bounds: Aabb,
    mesh_sink: M,
}

impl<M: MeshSink> DeformableSurface<M> {
    /// Generate the grid, hand the initial mesh to `mesh_sink` and the
    /// collision snapshot to `collider_sink`.
    ///
    /// Fails on an invalid config before anything is pushed to the host.
    pub fn new(
        config: SurfaceConfig,
        transform: LocalTransform,
        mut mesh_sink: M,
        collider_sink: &mut dyn ColliderSink,
    ) -> Result<Self> {
        config.validate()?;

        let grid = GridMesh::generate(config.width, config.height)?;
        let scheduler = BatchScheduler::new(grid.vertices.clone(), config.worker_threads)?;

        let normals = compute_normals(&grid.vertices, &grid.triangles);
        let tangents = compute_tangents(&grid.vertices, &normals, &grid.uvs, &grid.triangles);
        let bounds = Aabb::from_points(&grid.vertices).unwrap_or_default();

        let collision = CollisionShape::from_grid(&grid);
        collider_sink.set_collision_shape(collision.clone());

        mesh_sink.update_mesh(&MeshUpdate {
            vertices: &grid.vertices,
            normals: &normals,
            uvs: &grid.uvs,
            tangents: &tangents,
            triangles: &grid.triangles,
            bounds,
            material: config.material,
            topology_changed: true,
        });

        log::info!(
            "Deformable surface {}x{} ready (force {}, radius {}, {:?}, {:?}, {} workers)",
            config.width,
            config.height,
            config.force,
            config.radius,
            config.influence,
            config.depth,
            scheduler.worker_count()
        );

        Ok(Self {
            config,
            transform,
            grid,
            collision,
            scheduler,
            normals,
            tangents,
            bounds,
            mesh_sink,
        })
    }

    /// Queue an indentation for a physics contact, using the configured force and radius
    pub fn on_contact(&mut self, event: &ContactEvent) -> BatchId {
        self.issue_world(&event.world_points)
    }

    /// Pull every pending event from the physics collaborator
    pub fn drain_physics(&mut self, source: &mut dyn PhysicsSource) -> Vec<BatchId> {
        let mut issued = Vec::new();
        while let Some(event) = source.poll_contact() {
            issued.push(self.on_contact(&event));
        }
        issued
    }

    /// Merge finished batches and push the new geometry if anything merged.
    ///
    /// Faulted batches are logged and skipped; the surface keeps its last
    /// good state.
    pub fn tick(&mut self) -> PumpReport {
        let report = self.scheduler.pump();

        for err in &report.failed {
            log::warn!("Skipping deformation: {}", err);
        }

        if report.any_merged() {
            self.refresh_geometry();
            self.push_mesh();
        }

        report
    }

    fn issue_world(&mut self, world_points: &[Vec3]) -> BatchId {
        let local = adapt(world_points, &self.transform);
        self.scheduler.issue(local, self.config.indent_params())
    }

    fn refresh_geometry(&mut self) {
        let vertices = self.scheduler.current();
        self.normals = compute_normals(vertices, &self.grid.triangles);
        self.tangents = compute_tangents(vertices, &self.normals, &self.grid.uvs, &self.grid.triangles);
        self.bounds = Aabb::from_points(vertices).unwrap_or_default();
    }

    fn push_mesh(&mut self) {
        self.mesh_sink.update_mesh(&MeshUpdate {
            vertices: self.scheduler.current(),
            normals: &self.normals,
            uvs: &self.grid.uvs,
            tangents: &self.tangents,
            triangles: &self.grid.triangles,
            bounds: self.bounds,
            material: self.config.material,
            topology_changed: false,
        });
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn transform(&self) -> &LocalTransform {
        &self.transform
    }

    /// Live (possibly deformed) vertices in local space
    pub fn vertices(&self) -> &[Vec3] {
        self.scheduler.current()
    }

    /// Undeformed vertices in local space
    pub fn original_vertices(&self) -> &[Vec3] {
        self.scheduler.original()
    }

    /// Live vertex at lattice position (x, y)
    pub fn vertex_at(&self, x: u32, y: u32) -> Option<Vec3> {
        if x > self.grid.width || y > self.grid.height {
            return None;
        }
        Some(self.scheduler.current()[self.grid.vertex_index(x, y)])
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn tangents(&self) -> &[Vec4] {
        &self.tangents
    }

    pub fn triangles(&self) -> &[u32] {
        &self.grid.triangles
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn collision_shape(&self) -> &CollisionShape {
        &self.collision
    }

    pub fn pending_batches(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn scheduler_mut(&mut self) -> &mut BatchScheduler {
        &mut self.scheduler
    }

    pub fn mesh_sink(&self) -> &M {
        &self.mesh_sink
    }
}

impl<M: MeshSink> Deformable for DeformableSurface<M> {
    fn apply_force(&mut self, world_point: Vec3) -> BatchId {
        self.issue_world(&[world_point])
    }

    fn raycast(&self, world_ray: &Ray) -> Option<RayHit> {
        let local_ray = world_ray.transform(self.transform.world_to_local());
        let hit = self.collision.raycast(&local_ray)?;

        let point = self.transform.transform_point(hit.point);
        Some(RayHit {
            distance: (point - world_ray.origin).length(),
            point,
            normal: self.transform.transform_direction(hit.normal),
            triangle: hit.triangle,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::deform::kernel::{IndentParams, InfluenceRule};
    use crate::host::MaterialHandle;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub(crate) struct RecordingMesh {
        pub updates: Vec<(Vec<Vec3>, Vec<Vec3>, bool)>,
    }

    impl MeshSink for RecordingMesh {
        fn update_mesh(&mut self, update: &MeshUpdate<'_>) {
            self.updates.push((update.vertices.to_vec(), update.normals.to_vec(), update.topology_changed));
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingCollider {
        pub shapes: Vec<CollisionShape>,
    }

    impl ColliderSink for RecordingCollider {
        fn set_collision_shape(&mut self, shape: CollisionShape) {
            self.shapes.push(shape);
        }
    }

    struct QueuedPhysics(VecDeque<ContactEvent>);

    impl PhysicsSource for QueuedPhysics {
        fn poll_contact(&mut self) -> Option<ContactEvent> {
            self.0.pop_front()
        }
    }

    pub(crate) fn surface(config: SurfaceConfig) -> DeformableSurface<RecordingMesh> {
        let mut collider = RecordingCollider::default();
        DeformableSurface::new(config, LocalTransform::IDENTITY, RecordingMesh::default(), &mut collider)
            .unwrap()
    }

    fn four_by_four() -> SurfaceConfig {
        SurfaceConfig {
            width: 4,
            height: 4,
            force: 0.5,
            radius: 1.0,
            worker_threads: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_construction_pushes_mesh_and_collider() {
        let mut collider = RecordingCollider::default();
        let config = SurfaceConfig { material: MaterialHandle(3), ..four_by_four() };
        let surface = DeformableSurface::new(
            config,
            LocalTransform::IDENTITY,
            RecordingMesh::default(),
            &mut collider,
        ).unwrap();

        assert_eq!(collider.shapes.len(), 1);
        assert_eq!(surface.mesh_sink().updates.len(), 1);
        assert!(surface.mesh_sink().updates[0].2);
        assert_eq!(surface.vertices().len(), 25);
        assert_eq!(surface.triangles().len(), 96);
        assert!(surface.normals().iter().all(|n| *n == Vec3::Y));
    }

    #[test]
    fn test_invalid_size_fails_before_push() {
        let mut collider = RecordingCollider::default();
        let result = DeformableSurface::new(
            SurfaceConfig::with_size(0, 4),
            LocalTransform::IDENTITY,
            RecordingMesh::default(),
            &mut collider,
        );
        assert!(matches!(result, Err(Error::InvalidGridSize { .. })));
        assert!(collider.shapes.is_empty());
    }

    #[test]
    fn test_end_to_end_single_contact() {
        let mut surface = surface(four_by_four());
        surface.on_contact(&ContactEvent::point(Vec3::new(2.0, 0.0, 2.0)));
        let report = surface.tick();

        assert_eq!(report.merged.len(), 1);
        assert_eq!(surface.vertex_at(2, 2).unwrap().y, -0.5);
        assert_eq!(surface.vertex_at(0, 0).unwrap().y, 0.0);
        // Squared-distance rule with radius 1: direct neighbours are untouched
        assert_eq!(surface.vertex_at(1, 2).unwrap().y, 0.0);
        assert_eq!(surface.vertex_at(2, 3).unwrap().y, 0.0);
        assert_eq!(surface.bounds().min.y, -0.5);
    }

    #[test]
    fn test_end_to_end_euclidean() {
        let config = SurfaceConfig {
            radius: 1.5,
            influence: InfluenceRule::Euclidean,
            ..four_by_four()
        };
        let mut surface = surface(config);
        surface.on_contact(&ContactEvent::point(Vec3::new(2.0, 0.0, 2.0)));
        surface.tick();

        assert_eq!(surface.vertex_at(2, 2).unwrap().y, -0.5);
        assert_eq!(surface.vertex_at(1, 2).unwrap().y, -0.5);
        assert_eq!(surface.vertex_at(1, 1).unwrap().y, -0.5);
        assert_eq!(surface.vertex_at(0, 2).unwrap().y, 0.0);
        assert_eq!(surface.vertex_at(0, 0).unwrap().y, 0.0);
    }

    #[test]
    fn test_tick_pushes_only_when_merged() {
        let mut surface = surface(four_by_four());
        surface.tick();
        assert_eq!(surface.mesh_sink().updates.len(), 1);

        surface.apply_force(Vec3::new(1.0, 0.0, 1.0));
        surface.tick();
        let updates = &surface.mesh_sink().updates;
        assert_eq!(updates.len(), 2);
        assert!(!updates[1].2);
        assert_eq!(updates[1].0[5 + 1].y, -0.5);
        // Normals were recomputed for the dent
        assert_ne!(updates[1].1[5], Vec3::Y);
    }

    #[test]
    fn test_transformed_surface() {
        let mut collider = RecordingCollider::default();
        let transform = LocalTransform::from_translation(Vec3::new(100.0, 5.0, -20.0));
        let mut surface = DeformableSurface::new(
            four_by_four(),
            transform,
            RecordingMesh::default(),
            &mut collider,
        ).unwrap();

        surface.apply_force(Vec3::new(103.0, 5.0, -19.0));
        surface.tick();
        assert_eq!(surface.vertex_at(3, 1).unwrap().y, -0.5);
    }

    #[test]
    fn test_drain_physics() {
        let mut surface = surface(four_by_four());
        let mut physics = QueuedPhysics(VecDeque::from([
            ContactEvent::new(vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0)], Vec3::Y),
            ContactEvent::default(),
        ]));

        let issued = surface.drain_physics(&mut physics);
        assert_eq!(issued.len(), 2);
        assert_eq!(surface.pending_batches(), 2);

        let report = surface.tick();
        assert_eq!(report.merged, issued);
        assert_eq!(surface.vertex_at(0, 0).unwrap().y, -0.5);
        assert_eq!(surface.vertex_at(4, 4).unwrap().y, -0.5);
    }

    #[test]
    fn test_fault_degrades_silently() {
        let mut surface = surface(four_by_four());
        surface.apply_force(Vec3::new(1.0, 0.0, 1.0));
        surface.tick();
        let before = surface.vertices().to_vec();

        let nan = IndentParams { force: f32::NAN, ..Default::default() };
        surface.scheduler_mut().issue(vec![Vec3::new(3.0, 0.0, 3.0)], nan);
        let report = surface.tick();

        assert!(report.merged.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(surface.vertices(), before.as_slice());
        // No push for a tick that merged nothing
        assert_eq!(surface.mesh_sink().updates.len(), 2);
    }

    #[test]
    fn test_raycast_world_space() {
        let mut collider = RecordingCollider::default();
        let transform = LocalTransform::from_translation(Vec3::new(10.0, 2.0, 0.0));
        let surface = DeformableSurface::new(
            four_by_four(),
            transform,
            RecordingMesh::default(),
            &mut collider,
        ).unwrap();

        let hit = surface
            .raycast(&Ray::new(Vec3::new(12.0, 12.0, 1.5), Vec3::NEG_Y))
            .unwrap();
        assert!((hit.point - Vec3::new(12.0, 2.0, 1.5)).length() < 1e-4);
        assert!((hit.distance - 10.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_collision_ignores_deformation() {
        let mut surface = surface(four_by_four());
        surface.apply_force(Vec3::new(2.0, 0.0, 2.0));
        surface.tick();

        assert!(surface.collision_shape().vertices().iter().all(|v| v.y == 0.0));
        assert_eq!(surface.original_vertices()[12].y, 0.0);
        assert_eq!(surface.vertex_at(9, 9), None);
    }
}
