//! Snowprint - contact-driven deformation of planar grid surfaces
//!
//! A flat grid is generated once, then indented by batches of contact
//! points computed in parallel and merged back once per tick.

pub mod core;
pub mod math;
pub mod mesh;
pub mod deform;
pub mod host;
pub mod surface;
pub mod input;
pub mod markers;

pub use crate::core::{Error, Result, SurfaceConfig};
pub use crate::surface::{Deformable, DeformableSurface};
