//! Surface configuration, fixed at construction time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::types::Result;
use crate::deform::kernel::{DepthRule, IndentParams, InfluenceRule};
use crate::host::MaterialHandle;
use crate::mesh::grid;

/// Configuration for a deformable surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Number of grid cells along local X
    pub width: u32,
    /// Number of grid cells along local Z
    pub height: u32,
    /// Default indentation depth
    pub force: f32,
    /// Influence threshold, interpreted according to `influence`
    pub radius: f32,
    /// How `radius` is compared against vertex-to-contact distance
    pub influence: InfluenceRule,
    /// Where the indented height is measured from
    pub depth: DepthRule,
    /// Kernel worker threads (0 = all available)
    pub worker_threads: usize,
    /// Opaque material handed to the mesh sink
    pub material: MaterialHandle,
    /// How long a debug hit marker stays alive
    pub marker_lifetime_ms: u64,
    /// Pointer hits are lifted this far along the hit normal before indenting
    pub pointer_normal_offset: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            force: 0.5,
            radius: 1.0,
            influence: InfluenceRule::SquaredDistance,
            depth: DepthRule::FromOriginal,
            worker_threads: 0,
            material: MaterialHandle::default(),
            marker_lifetime_ms: 500,
            pointer_normal_offset: 0.1,
        }
    }
}

impl SurfaceConfig {
    /// Create a config for a `width` x `height` grid with default indentation settings
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SurfaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Reject configurations that would produce a degenerate mesh or kernel
    pub fn validate(&self) -> Result<()> {
        grid::check_size(self.width, self.height)?;
        if !self.force.is_finite() || self.force < 0.0 {
            return Err(Error::Config(format!("force must be finite and >= 0, got {}", self.force)));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(Error::Config(format!("radius must be finite and >= 0, got {}", self.radius)));
        }
        if !self.pointer_normal_offset.is_finite() {
            return Err(Error::Config("pointer_normal_offset must be finite".into()));
        }
        Ok(())
    }

    /// Kernel parameters for batches issued with the configured defaults
    pub fn indent_params(&self) -> IndentParams {
        IndentParams {
            force: self.force,
            radius: self.radius,
            influence: self.influence,
            depth: self.depth,
        }
    }
}
