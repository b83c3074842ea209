use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use common::storage::{types::transcode_status::TranscodeStatus, workspace::JobId};

use crate::{api_state::ApiState, error::ApiError};

pub async fn get_transcode_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: JobId = id.parse()?;
    let status = TranscodeStatus::get(&id, &state.db).await?;

    Ok(Json(status))
}
