//! In-flight deformation batches.
//!
//! A batch is an owned, move-only record: the scheduler keeps it in its
//! pending queue and `wait` consumes it exactly once at merge time.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use super::kernel::{indent_sparse, IndentParams};

/// Identifier of an issued batch. Ids increase in issue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    /// Kernel still running
    Issued,
    /// Kernel finished, waiting for the next pump
    Completed,
    /// Output copied into the live vertex buffer
    Merged,
    /// Kernel faulted; output discarded
    Failed,
}

/// Influenced vertices as `(index, new position)`, ascending by index
pub type BatchOutput = Vec<(u32, Vec3)>;

type KernelOutcome = std::result::Result<BatchOutput, String>;

/// One scheduled indentation over all vertices against one set of contacts
pub struct DeformationBatch {
    id: BatchId,
    contacts: Arc<[Vec3]>,
    params: IndentParams,
    issued_at: Instant,
    receiver: Receiver<KernelOutcome>,
    /// Result taken off the channel by `poll`, kept until `wait`
    outcome: Option<KernelOutcome>,
}

impl DeformationBatch {
    /// Start the kernel on `pool` and return immediately.
    ///
    /// `original` is shared, `snapshot` and `contacts` are owned by this
    /// batch and its worker and are released when both are done.
    pub fn launch(
        id: BatchId,
        pool: &rayon::ThreadPool,
        original: Arc<[Vec3]>,
        snapshot: Arc<[Vec3]>,
        contacts: Arc<[Vec3]>,
        params: IndentParams,
    ) -> Self {
        let (sender, receiver) = mpsc::sync_channel(1);
        let worker_contacts = Arc::clone(&contacts);

        pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                indent_sparse(&original, &snapshot, &worker_contacts, &params)
            }))
            .map_err(|payload| panic_message(payload.as_ref()))
            .and_then(|output| {
                match output.iter().find(|(_, p)| !p.is_finite()) {
                    Some((i, p)) => Err(format!("non-finite output {} at vertex {}", p, i)),
                    None => Ok(output),
                }
            });
            // The receiver only disappears if the scheduler was dropped
            let _ = sender.send(outcome);
        });

        Self {
            id,
            contacts,
            params,
            issued_at: Instant::now(),
            receiver,
            outcome: None,
        }
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn contacts(&self) -> &[Vec3] {
        &self.contacts
    }

    pub fn params(&self) -> &IndentParams {
        &self.params
    }

    /// Check for completion without blocking
    pub fn poll(&mut self) -> BatchState {
        if self.outcome.is_some() {
            return BatchState::Completed;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                BatchState::Completed
            }
            Err(TryRecvError::Empty) => BatchState::Issued,
            Err(TryRecvError::Disconnected) => BatchState::Completed,
        }
    }

    /// Block until the kernel is done and take its output
    pub fn wait(mut self) -> Result<BatchOutput> {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => self
                .receiver
                .recv()
                .unwrap_or_else(|_| Err("worker exited without reporting".to_string())),
        };

        log::debug!(
            "Batch {} finished after {:.2}ms ({} contacts)",
            self.id,
            self.issued_at.elapsed().as_secs_f64() * 1000.0,
            self.contacts.len()
        );

        outcome.map_err(|reason| Error::KernelExecutionFault { batch: self.id, reason })
    }
}

impl fmt::Debug for DeformationBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeformationBatch")
            .field("id", &self.id)
            .field("contacts", &self.contacts.len())
            .field("params", &self.params)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("kernel panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("kernel panicked: {}", s)
    } else {
        "kernel panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::grid::GridMesh;

    fn pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_launch_and_wait() {
        let pool = pool();
        let original: Arc<[Vec3]> = GridMesh::generate(4, 4).unwrap().vertices.into();
        let batch = DeformationBatch::launch(
            BatchId(1),
            &pool,
            Arc::clone(&original),
            Arc::clone(&original),
            vec![Vec3::new(2.0, 0.0, 2.0)].into(),
            IndentParams { force: 0.5, radius: 1.0, ..Default::default() },
        );
        assert_eq!(batch.id(), BatchId(1));
        assert_eq!(batch.contacts().len(), 1);

        let output = batch.wait().unwrap();
        assert_eq!(output, vec![(12, Vec3::new(2.0, -0.5, 2.0))]);
    }

    #[test]
    fn test_poll_reaches_completed() {
        let pool = pool();
        let original: Arc<[Vec3]> = GridMesh::generate(2, 2).unwrap().vertices.into();
        let mut batch = DeformationBatch::launch(
            BatchId(7),
            &pool,
            Arc::clone(&original),
            original,
            Arc::from(Vec::new()),
            IndentParams::default(),
        );

        let start = Instant::now();
        while batch.poll() == BatchState::Issued {
            assert!(start.elapsed().as_secs() < 10, "batch never completed");
            std::thread::yield_now();
        }
        assert_eq!(batch.poll(), BatchState::Completed);
        assert!(batch.wait().unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_output_is_fault() {
        let pool = pool();
        let original: Arc<[Vec3]> = GridMesh::generate(2, 2).unwrap().vertices.into();
        let batch = DeformationBatch::launch(
            BatchId(3),
            &pool,
            Arc::clone(&original),
            original,
            vec![Vec3::ZERO].into(),
            IndentParams { force: f32::NAN, ..Default::default() },
        );

        let err = batch.wait().unwrap_err();
        assert!(matches!(err, Error::KernelExecutionFault { batch: BatchId(3), .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_display_id() {
        assert_eq!(BatchId(42).to_string(), "#42");
    }
}
