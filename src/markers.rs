//! Transient hit markers for debugging input.
//!
//! Fire-and-forget: each marker is spawned through the host's
//! [`MarkerSink`] and despawned by a timed tokio task. Nothing here touches
//! deformation state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::core::types::Vec3;
use crate::host::{MarkerId, MarkerSink};

/// Spawns markers that remove themselves after a fixed lifetime
pub struct HitMarkers {
    runtime: Handle,
    sink: Arc<dyn MarkerSink>,
    lifetime: Duration,
    next_id: AtomicU64,
}

impl HitMarkers {
    pub fn new(runtime: Handle, sink: Arc<dyn MarkerSink>, lifetime: Duration) -> Self {
        Self {
            runtime,
            sink,
            lifetime,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Show a marker at `world_position` and schedule its removal
    pub fn spawn(&self, world_position: Vec3) -> MarkerId {
        let id = MarkerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sink.spawn_marker(id, world_position);

        let sink = Arc::clone(&self.sink);
        let lifetime = self.lifetime;
        self.runtime.spawn(async move {
            tokio::time::sleep(lifetime).await;
            sink.despawn_marker(id);
        });

        id
    }
}
