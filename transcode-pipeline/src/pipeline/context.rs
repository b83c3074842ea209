use common::{error::AppError, storage::db::SurrealDbClient, storage::workspace::JobId};
use tracing::error;

use crate::job::TranscodeJob;

use super::{config::TranscodeConfig, services::TranscodeServices};

pub struct PipelineContext<'a> {
    pub job: &'a mut TranscodeJob,
    pub job_id: JobId,
    pub db: &'a SurrealDbClient,
    pub config: &'a TranscodeConfig,
    pub services: &'a TranscodeServices,
    pub segment_count: usize,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        job: &'a mut TranscodeJob,
        db: &'a SurrealDbClient,
        config: &'a TranscodeConfig,
        services: &'a TranscodeServices,
    ) -> Self {
        let job_id = job.id;
        Self {
            job,
            job_id,
            db,
            config,
            services,
            segment_count: 0,
        }
    }

    pub fn abort(&mut self, err: AppError) -> AppError {
        error!(
            job_id = %self.job_id,
            code = err.code(),
            error = %err,
            "transcode pipeline aborted"
        );
        err
    }
}
