//! Batch scheduler.
//!
//! Issues indentation batches onto a dedicated rayon pool without blocking
//! and merges their results into the live vertex buffer once per tick.
//! Merges happen only inside `pump`, in issue order, so the live buffer is
//! never written concurrently with a kernel or another merge.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use super::batch::{BatchId, BatchState, DeformationBatch};
use super::kernel::IndentParams;

/// How many failed batch ids `state` remembers
pub const FAILED_HISTORY: usize = 64;

/// What a single `pump` did
#[derive(Debug, Default)]
pub struct PumpReport {
    /// Batches merged into the live buffer, in merge order
    pub merged: Vec<BatchId>,
    /// Batches that faulted and were discarded
    pub failed: Vec<Error>,
}

impl PumpReport {
    /// True if the live vertex buffer may have changed
    pub fn any_merged(&self) -> bool {
        !self.merged.is_empty()
    }
}

/// Owns the authoritative vertex buffers and the in-flight batch queue
pub struct BatchScheduler {
    pool: rayon::ThreadPool,
    /// Generation-time vertices, never mutated
    original: Arc<[Vec3]>,
    /// Live vertices, mutated only by `pump`
    current: Vec<Vec3>,
    pending: VecDeque<DeformationBatch>,
    next_id: u64,
    /// Most recent failures, oldest first, at most `FAILED_HISTORY`
    failed_ids: VecDeque<BatchId>,
    /// Retired ids below this may have failed but are no longer tracked
    history_floor: u64,
}

impl BatchScheduler {
    /// Create a scheduler over `original`.
    ///
    /// `worker_threads == 0` uses all available cores. The pool never has
    /// more workers than vertices.
    pub fn new(original: Vec<Vec3>, worker_threads: usize) -> Result<Self> {
        let requested = if worker_threads == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            worker_threads
        };
        let threads = requested.min(original.len()).max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("indent-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        log::debug!("Batch scheduler: {} vertices, {} workers", original.len(), threads);

        let current = original.clone();
        Ok(Self {
            pool,
            original: original.into(),
            current,
            pending: VecDeque::new(),
            next_id: 1,
            failed_ids: VecDeque::new(),
            history_floor: 1,
        })
    }

    /// Snapshot the live buffer and start an indentation batch.
    ///
    /// Never blocks. An empty `contacts` list is valid and merges as a no-op.
    pub fn issue(&mut self, contacts: Vec<Vec3>, params: IndentParams) -> BatchId {
        let id = BatchId(self.next_id);
        self.next_id += 1;

        log::debug!(
            "Issuing batch {} ({} contacts, force {}, radius {})",
            id, contacts.len(), params.force, params.radius
        );

        let batch = DeformationBatch::launch(
            id,
            &self.pool,
            Arc::clone(&self.original),
            Arc::from(self.current.as_slice()),
            contacts.into(),
            params,
        );
        self.pending.push_back(batch);
        id
    }

    /// Merge every pending batch, oldest first.
    ///
    /// Blocks on each batch that is still running. A faulted batch is
    /// dropped without touching the live buffer and reported in
    /// `PumpReport::failed`; later batches still merge.
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();

        while let Some(batch) = self.pending.pop_front() {
            let id = batch.id();
            match batch.wait() {
                Ok(output) => {
                    for &(index, position) in &output {
                        self.current[index as usize] = position;
                    }
                    log::debug!("Merged batch {} ({} vertices changed)", id, output.len());
                    report.merged.push(id);
                }
                Err(err) => {
                    if self.failed_ids.len() == FAILED_HISTORY {
                        if let Some(oldest) = self.failed_ids.pop_front() {
                            self.history_floor = oldest.0 + 1;
                        }
                    }
                    self.failed_ids.push_back(id);
                    report.failed.push(err);
                }
            }
        }

        report
    }

    /// Lifecycle state of a batch.
    ///
    /// `None` for an id that was never issued, or for a retired id older
    /// than the last `FAILED_HISTORY` failures.
    pub fn state(&mut self, id: BatchId) -> Option<BatchState> {
        if id.0 == 0 || id.0 >= self.next_id {
            return None;
        }
        if let Some(batch) = self.pending.iter_mut().find(|b| b.id() == id) {
            return Some(batch.poll());
        }
        if id.0 < self.history_floor {
            return None;
        }
        if self.failed_ids.contains(&id) {
            Some(BatchState::Failed)
        } else {
            Some(BatchState::Merged)
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Live vertex buffer
    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    /// Undeformed vertex buffer
    pub fn original(&self) -> &[Vec3] {
        &self.original
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}
