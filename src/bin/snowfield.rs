//! Headless snowfield demo: a walker leaves footprints, a pointer pokes holes.
//!
//! Usage: cargo run --release --bin snowfield -- [--config path/to/surface.json] [--ticks N]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use snowprint::core::logging;
use snowprint::deform::ContactEvent;
use snowprint::host::{
    ColliderSink, MarkerId, MarkerSink, MeshSink, MeshUpdate, PhysicsSource,
};
use snowprint::input::PointerInput;
use snowprint::markers::HitMarkers;
use snowprint::math::{LocalTransform, Ray};
use snowprint::mesh::CollisionShape;
use snowprint::{DeformableSurface, SurfaceConfig};

use glam::Vec3;

/// Logs mesh pushes instead of uploading them
#[derive(Default)]
struct LogMesh {
    pushes: usize,
}

impl MeshSink for LogMesh {
    fn update_mesh(&mut self, update: &MeshUpdate<'_>) {
        self.pushes += 1;
        log::debug!(
            "Mesh push #{}: {} vertices, {} bytes, bounds y [{:.2}, {:.2}]",
            self.pushes,
            update.vertices.len(),
            update.interleaved().len() * std::mem::size_of::<snowprint::host::MeshVertex>(),
            update.bounds.min.y,
            update.bounds.max.y,
        );
    }
}

struct LogCollider;

impl ColliderSink for LogCollider {
    fn set_collision_shape(&mut self, shape: CollisionShape) {
        log::info!("Collision shape: {} triangles", shape.triangles().len() / 3);
    }
}

struct LogMarkers;

impl MarkerSink for LogMarkers {
    fn spawn_marker(&self, id: MarkerId, world_position: Vec3) {
        log::info!("Marker {:?} at {}", id, world_position);
    }

    fn despawn_marker(&self, id: MarkerId) {
        log::info!("Marker {:?} gone", id);
    }
}

/// A walker crossing the field diagonally, one footprint per tick
struct Walker {
    queue: VecDeque<ContactEvent>,
}

impl Walker {
    fn new(origin: Vec3, steps: usize) -> Self {
        let queue = (0..steps)
            .map(|i| {
                let side = if i % 2 == 0 { -0.6 } else { 0.6 };
                let center = origin + Vec3::new(1.5 + i as f32 * 1.2, 0.0, 1.5 + i as f32 * 1.2 + side);
                let foot = [
                    Vec3::new(-0.3, 0.0, -0.5),
                    Vec3::new(0.3, 0.0, -0.5),
                    Vec3::new(-0.3, 0.0, 0.5),
                    Vec3::new(0.3, 0.0, 0.5),
                ];
                ContactEvent::new(foot.iter().map(|&o| center + o).collect(), Vec3::NEG_Y)
            })
            .collect();
        Self { queue }
    }
}

impl PhysicsSource for Walker {
    fn poll_contact(&mut self) -> Option<ContactEvent> {
        self.queue.pop_front()
    }
}

fn main() -> snowprint::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.iter().position(|a| a == "--config").and_then(|i| args.get(i + 1)) {
        Some(path) => SurfaceConfig::load(path)?,
        None => SurfaceConfig::with_size(24, 16),
    };
    let ticks = args
        .iter()
        .position(|a| a == "--ticks")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(12);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()?;
    let markers = HitMarkers::new(
        runtime.handle().clone(),
        Arc::new(LogMarkers),
        Duration::from_millis(config.marker_lifetime_ms),
    );

    let origin = Vec3::new(-10.0, 0.0, -5.0);
    let pointer_offset = config.pointer_normal_offset;
    let (width, height) = (config.width, config.height);
    let mut surface = DeformableSurface::new(
        config,
        LocalTransform::from_translation(origin),
        LogMesh::default(),
        &mut LogCollider,
    )?;

    let mut walker = Walker::new(origin, ticks);
    let start = Instant::now();

    for tick in 0..ticks {
        // Stagger: physics first, pointer every third tick
        surface.drain_physics(&mut walker);
        if tick % 3 == 0 {
            let target = origin + Vec3::new(width as f32 - 2.0 - tick as f32 * 0.5, 0.0, 2.0);
            let ray = Ray::new(target + Vec3::Y * 10.0, Vec3::NEG_Y);
            let mut pointer = PointerInput::new(&mut surface, pointer_offset).with_markers(&markers);
            pointer.update(true, &ray);
        }

        let report = surface.tick();
        log::info!(
            "Tick {}: merged {}, failed {}",
            tick,
            report.merged.len(),
            report.failed.len()
        );
    }

    let elapsed = start.elapsed();
    log::info!("{} ticks in {:.1}ms", ticks, elapsed.as_secs_f64() * 1000.0);

    for y in 0..=height {
        let row: String = (0..=width)
            .map(|x| match surface.vertex_at(x, y).map(|v| v.y) {
                Some(h) if h < 0.0 => '#',
                _ => '.',
            })
            .collect();
        log::info!("{}", row);
    }

    // Let outstanding markers expire before the runtime shuts down
    std::thread::sleep(markers.lifetime() + Duration::from_millis(50));
    Ok(())
}
