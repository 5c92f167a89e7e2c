//! Contact-driven deformation: kernel, batches, scheduling, contact adaptation

pub mod kernel;
pub mod batch;
pub mod scheduler;
pub mod contact;

pub use kernel::{indent, indent_sparse, DepthRule, IndentParams, InfluenceRule};
pub use batch::{BatchId, BatchState, DeformationBatch};
pub use scheduler::{BatchScheduler, PumpReport, FAILED_HISTORY};
pub use contact::{adapt, ContactEvent};
