use common::{
    error::AppError,
    storage::types::transcode_status::{JobPhase, TranscodeStatus},
};
use state_machines::core::GuardError;
use tracing::{debug, info, instrument, warn};

use super::{
    config::{SegmentLayout, TranscodeConfig},
    context::PipelineContext,
    services::Prober,
    state::{Completed, Converted, Created, Probed, Split, TranscodeMachine},
};
use crate::{job::TranscodeJob, utils::deadline::with_deadline};

/// Probes the original upload and applies the duration gate.
///
/// Returns the probed duration. Only the first call per job reaches the prober.
pub async fn check_duration(
    job: &mut TranscodeJob,
    prober: &dyn Prober,
    config: &TranscodeConfig,
) -> Result<f64, AppError> {
    let duration = job.original.duration(prober, config.tool_timeout).await?;
    if duration > config.max_duration_secs {
        return Err(AppError::DurationExceeded {
            duration,
            max: config.max_duration_secs,
        });
    }
    Ok(duration)
}

#[instrument(level = "trace", skip_all, fields(job_id = %ctx.job_id))]
pub async fn probe(
    machine: TranscodeMachine<(), Created>,
    ctx: &mut PipelineContext<'_>,
) -> Result<TranscodeMachine<(), Probed>, AppError> {
    let duration = check_duration(ctx.job, ctx.services.prober.as_ref(), ctx.config).await?;

    TranscodeStatus::advance(&ctx.job_id, JobPhase::Probed, ctx.db).await?;
    debug!(job_id = %ctx.job_id, duration_secs = duration, "original within duration limit");

    machine
        .probe()
        .map_err(|(_, guard)| map_guard_error("probe", &guard))
}

#[instrument(level = "trace", skip_all, fields(job_id = %ctx.job_id))]
pub async fn convert(
    machine: TranscodeMachine<(), Probed>,
    ctx: &mut PipelineContext<'_>,
) -> Result<TranscodeMachine<(), Converted>, AppError> {
    let target = &ctx.config.target;
    let input = ctx.job.original_path().to_path_buf();
    let output = ctx.job.converted_path(&target.extension);

    with_deadline(
        ctx.config.tool_timeout,
        ctx.services.converter.convert(&input, &output, target),
        |limit| AppError::Convert(format!("conversion timed out after {}s", limit.as_secs())),
    )
    .await?;

    if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
        return Err(AppError::Convert(format!(
            "converter reported success but {} is missing",
            output.display()
        )));
    }

    TranscodeStatus::advance(&ctx.job_id, JobPhase::Converted, ctx.db).await?;
    debug!(job_id = %ctx.job_id, output = %output.display(), "original converted");

    machine
        .convert()
        .map_err(|(_, guard)| map_guard_error("convert", &guard))
}

#[instrument(level = "trace", skip_all, fields(job_id = %ctx.job_id))]
pub async fn split(
    machine: TranscodeMachine<(), Converted>,
    ctx: &mut PipelineContext<'_>,
) -> Result<TranscodeMachine<(), Split>, AppError> {
    let target = &ctx.config.target;
    let input = ctx.job.converted_path(&target.extension);
    let layout = SegmentLayout {
        segment_pattern: ctx.job.segment_pattern(),
        manifest: ctx.job.manifest_path(),
        segment_duration_secs: ctx.config.segment_duration_secs,
    };

    with_deadline(
        ctx.config.tool_timeout,
        ctx.services.segmenter.segment(&input, &layout, target),
        |limit| AppError::Split(format!("segmentation timed out after {}s", limit.as_secs())),
    )
    .await?;

    let segments = ctx.job.segments().await?;
    if segments.is_empty() {
        return Err(AppError::Split("segmenter produced no segments".to_string()));
    }
    ctx.segment_count = segments.len();

    TranscodeStatus::advance(&ctx.job_id, JobPhase::Split, ctx.db).await?;
    debug!(job_id = %ctx.job_id, segments = ctx.segment_count, "converted file split");

    machine
        .split()
        .map_err(|(_, guard)| map_guard_error("split", &guard))
}

#[instrument(level = "trace", skip_all, fields(job_id = %ctx.job_id))]
pub async fn complete(
    machine: TranscodeMachine<(), Split>,
    ctx: &mut PipelineContext<'_>,
) -> Result<TranscodeMachine<(), Completed>, AppError> {
    TranscodeStatus::advance(&ctx.job_id, JobPhase::Completed, ctx.db).await?;

    if ctx.config.remove_original_after_success {
        let original = ctx.job.original_path();
        if let Err(err) = tokio::fs::remove_file(original).await {
            warn!(job_id = %ctx.job_id, error = %err, "failed to remove original upload");
        }
    }

    info!(job_id = %ctx.job_id, segments = ctx.segment_count, "transcode completed");

    machine
        .complete()
        .map_err(|(_, guard)| map_guard_error("complete", &guard))
}

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!(
        "invalid transcode pipeline transition during {event}: {guard:?}"
    ))
}
