//! Mathematical utilities

pub mod aabb;
pub mod ray;
pub mod transform;

pub use aabb::Aabb;
pub use ray::Ray;
pub use transform::LocalTransform;
