#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod ingest;
pub mod job;
pub mod pipeline;
pub mod probe;
pub mod queue;
pub mod utils;

pub use pipeline::{AdmittedJob, TranscodeConfig, TranscodePipeline, TranscodeServices};
pub use queue::TranscodeQueue;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Drains the queue one job at a time until every sender is dropped.
///
/// A failed job is already recorded by the pipeline; the loop only logs it and
/// moves on to the next one.
pub async fn run_worker_loop(
    mut jobs: mpsc::Receiver<AdmittedJob>,
    transcode_pipeline: Arc<TranscodePipeline>,
) {
    info!("transcode worker started");

    while let Some(job) = jobs.recv().await {
        let job_id = job.id();
        info!(%job_id, duration_secs = job.duration_secs(), "dequeued transcode job");
        if let Err(err) = transcode_pipeline.process_job(job).await {
            error!(%job_id, code = err.code(), error = %err, "transcode job failed");
        }
    }

    info!("transcode queue closed; worker stopping");
}
