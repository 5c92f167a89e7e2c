//! Indentation kernel.
//!
//! Pure per-vertex rule: for every contact (in list order) whose distance
//! test passes, the vertex is replaced by its indented height. The last
//! influencing contact wins; there is no blending. Vertices are independent
//! of each other, so the kernel runs as a rayon parallel map.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;

/// How the influence radius is compared against vertex-to-contact distance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceRule {
    /// `|v - c|^2 < radius`: squared distance against the linear radius.
    /// Effective reach is `sqrt(radius)`.
    #[default]
    SquaredDistance,
    /// `|v - c|^2 < radius^2`: true Euclidean reach of `radius`.
    Euclidean,
}

impl InfluenceRule {
    /// Whether a vertex `distance_sq` away from a contact is influenced
    #[inline]
    pub fn influences(self, distance_sq: f32, radius: f32) -> bool {
        match self {
            InfluenceRule::SquaredDistance => distance_sq < radius,
            InfluenceRule::Euclidean => distance_sq < radius * radius,
        }
    }
}

/// What an influenced vertex is lowered from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthRule {
    /// `original + DOWN * force`. Repeated hits never dig deeper.
    #[default]
    FromOriginal,
    /// `current + DOWN * force` for each influencing contact.
    Accumulate,
}

/// Per-batch kernel parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndentParams {
    pub force: f32,
    pub radius: f32,
    pub influence: InfluenceRule,
    pub depth: DepthRule,
}

impl Default for IndentParams {
    fn default() -> Self {
        Self {
            force: 0.5,
            radius: 1.0,
            influence: InfluenceRule::default(),
            depth: DepthRule::default(),
        }
    }
}

/// New position of one vertex, or `None` if no contact influences it.
#[inline]
pub fn indent_vertex(
    original: Vec3,
    current: Vec3,
    contacts: &[Vec3],
    params: &IndentParams,
) -> Option<Vec3> {
    let mut result = None;
    for &contact in contacts {
        // The distance test always uses the vertex as it was when the batch
        // was issued, even if an earlier contact already moved it.
        if params.influence.influences(current.distance_squared(contact), params.radius) {
            let base = match params.depth {
                DepthRule::FromOriginal => original,
                DepthRule::Accumulate => result.unwrap_or(current),
            };
            result = Some(base + Vec3::NEG_Y * params.force);
        }
    }
    result
}

/// Compute updated positions for every vertex.
///
/// Unaffected vertices keep their `current` position.
pub fn indent(
    original: &[Vec3],
    current: &[Vec3],
    contacts: &[Vec3],
    params: &IndentParams,
) -> Vec<Vec3> {
    debug_assert_eq!(original.len(), current.len());
    original
        .par_iter()
        .zip(current.par_iter())
        .map(|(&o, &c)| indent_vertex(o, c, contacts, params).unwrap_or(c))
        .collect()
}

/// Only the vertices that changed, as `(index, position)` in ascending index order.
pub fn indent_sparse(
    original: &[Vec3],
    current: &[Vec3],
    contacts: &[Vec3],
    params: &IndentParams,
) -> Vec<(u32, Vec3)> {
    debug_assert_eq!(original.len(), current.len());
    if contacts.is_empty() {
        return Vec::new();
    }
    original
        .par_iter()
        .zip(current.par_iter())
        .enumerate()
        .filter_map(|(i, (&o, &c))| {
            indent_vertex(o, c, contacts, params).map(|p| (i as u32, p))
        })
        .collect()
}
