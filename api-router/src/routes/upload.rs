use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{BaseMultipart, FieldData, TryFromMultipart};
use common::error::AppError;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadAudioParams {
    // the route's DefaultBodyLimit caps the size
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

#[derive(Debug, Serialize)]
pub struct UploadAudioResponse {
    pub id: String,
    pub file_name: String,
    pub duration: f64,
}

/// Stores, probes and queues an uploaded audio file.
///
/// Responds once the job is queued; conversion progress is polled through
/// the transcode status route.
pub async fn upload_audio(
    State(state): State<ApiState>,
    multipart: BaseMultipart<UploadAudioParams, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let FieldData { metadata, contents } = multipart.data.file;
    let file_name = metadata.file_name.unwrap_or_default();

    info!(
        file_name = %file_name,
        content_type = metadata.content_type.as_deref().unwrap_or("<missing>"),
        "Received audio upload"
    );

    let upload = tokio::fs::File::open(contents.path())
        .await
        .map_err(|e| AppError::Storage(format!("reading buffered upload: {e}")))?;

    let job = state
        .pipeline
        .ingest(upload, &file_name, metadata.content_type.as_deref())
        .await?;
    let admitted = state.pipeline.admit(job).await?;

    let job_id = admitted.id();
    let response = UploadAudioResponse {
        id: job_id.to_string(),
        file_name,
        duration: admitted.duration_secs(),
    };

    if let Err(err) = state.queue.submit(admitted).await {
        state.pipeline.fail_job(&job_id).await;
        return Err(err.into());
    }

    Ok((StatusCode::OK, Json(response)))
}
