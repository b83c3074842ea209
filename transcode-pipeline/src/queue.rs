use common::error::AppError;
use tokio::sync::mpsc;
use tracing::debug;

use crate::pipeline::AdmittedJob;

/// Intake side of the bounded job queue drained by [`crate::run_worker_loop`].
///
/// `submit` waits while the buffer is full, so callers feel back-pressure
/// instead of piling up jobs.
#[derive(Clone)]
pub struct TranscodeQueue {
    sender: mpsc::Sender<AdmittedJob>,
}

impl TranscodeQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AdmittedJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub async fn submit(&self, job: AdmittedJob) -> Result<(), AppError> {
        let job_id = job.id();
        self.sender.send(job).await.map_err(|_| {
            AppError::InternalError(format!("transcode worker is gone; job {job_id} not queued"))
        })?;
        debug!(%job_id, "job queued");
        Ok(())
    }

    /// Free buffer slots right now.
    pub fn available_slots(&self) -> usize {
        self.sender.capacity()
    }
}
