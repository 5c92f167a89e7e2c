//! Input-driven force application

pub mod pointer;

pub use pointer::{PointerHit, PointerInput};
