mod config;
mod context;
mod services;
mod stages;
mod state;

pub use config::{SegmentLayout, TargetFormat, TranscodeConfig};
pub use services::{Converter, Prober, Segmenter, TranscodeServices};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use common::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::transcode_status::TranscodeStatus,
        workspace::{JobId, WorkspaceRoot},
    },
};
use tokio::{io::AsyncRead, sync::Semaphore};
use tracing::{info, warn};

use crate::{ingest::ingest, job::TranscodeJob};

use self::{
    context::PipelineContext,
    stages::{check_duration, complete, convert, probe, split},
    state::created,
};

/// A job that passed the duration gate and owns a status record.
#[derive(Debug)]
pub struct AdmittedJob {
    job: TranscodeJob,
    duration_secs: f64,
}

impl AdmittedJob {
    pub fn id(&self) -> JobId {
        self.job.id
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

#[allow(clippy::module_name_repetitions)]
pub struct TranscodePipeline {
    db: Arc<SurrealDbClient>,
    workspaces: WorkspaceRoot,
    config: TranscodeConfig,
    services: TranscodeServices,
    execution_slot: Arc<Semaphore>,
}

impl TranscodePipeline {
    pub fn new(
        db: Arc<SurrealDbClient>,
        workspaces: WorkspaceRoot,
        config: TranscodeConfig,
        services: TranscodeServices,
    ) -> Self {
        Self {
            db,
            workspaces,
            config,
            services,
            execution_slot: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    pub fn workspaces(&self) -> &WorkspaceRoot {
        &self.workspaces
    }

    /// Stores an upload in a new workspace. See [`ingest`].
    pub async fn ingest<R>(
        &self,
        reader: R,
        declared_filename: &str,
        declared_content_type: Option<&str>,
    ) -> Result<TranscodeJob, AppError>
    where
        R: AsyncRead + Unpin,
    {
        ingest(&self.workspaces, reader, declared_filename, declared_content_type).await
    }

    /// Probes the job's original and registers its status record.
    ///
    /// Rejected jobs never get a status record; their workspace is removed when
    /// `remove_failed_workspaces` is set.
    #[tracing::instrument(skip_all, fields(job_id = %job.id))]
    pub async fn admit(&self, mut job: TranscodeJob) -> Result<AdmittedJob, AppError> {
        let duration_secs =
            match check_duration(&mut job, self.services.prober.as_ref(), &self.config).await {
                Ok(duration) => duration,
                Err(err) => {
                    warn!(job_id = %job.id, code = err.code(), error = %err, "upload rejected");
                    self.discard_workspace(&job.id).await;
                    return Err(err);
                }
            };

        if let Err(err) = TranscodeStatus::create(&job.id, &self.db).await {
            self.discard_workspace(&job.id).await;
            return Err(err);
        }

        info!(job_id = %job.id, duration_secs, "upload admitted");
        Ok(AdmittedJob { job, duration_secs })
    }

    /// Runs an admitted job through convert and split, holding the single execution slot.
    #[tracing::instrument(skip_all, fields(job_id = %admitted.job.id))]
    pub async fn process_job(&self, admitted: AdmittedJob) -> Result<(), AppError> {
        let _permit = Arc::clone(&self.execution_slot)
            .acquire_owned()
            .await
            .map_err(|_| AppError::InternalError("execution slot closed".to_string()))?;

        let mut job = admitted.job;
        match self.drive_pipeline(&mut job).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.fail_job(&job.id).await;
                Err(err)
            }
        }
    }

    /// Marks a job that will not finish as failed and clears its workspace.
    pub async fn fail_job(&self, id: &JobId) {
        if let Err(err) = TranscodeStatus::mark_failed(id, &self.db).await {
            warn!(job_id = %id, error = %err, "failed to record job failure");
        }
        self.discard_workspace(id).await;
    }

    async fn discard_workspace(&self, id: &JobId) {
        if self.config.remove_failed_workspaces {
            self.workspaces.remove(id).await;
        }
    }

    fn duration_millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    async fn drive_pipeline(&self, job: &mut TranscodeJob) -> Result<(), AppError> {
        let mut ctx = PipelineContext::new(job, self.db.as_ref(), &self.config, &self.services);

        let machine = created();

        let pipeline_started = Instant::now();

        let machine = probe(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;

        let stage_start = Instant::now();
        let machine = convert(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let convert_duration = stage_start.elapsed();

        let stage_start = Instant::now();
        let machine = split(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let split_duration = stage_start.elapsed();

        let _machine = complete(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;

        info!(
            job_id = %ctx.job_id,
            total_ms = Self::duration_millis(pipeline_started.elapsed()),
            convert_ms = Self::duration_millis(convert_duration),
            split_ms = Self::duration_millis(split_duration),
            segments = ctx.segment_count,
            "transcode pipeline finished"
        );

        Ok(())
    }
}
