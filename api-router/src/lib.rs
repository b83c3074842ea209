use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{
    image::upload_image, liveness::live, readiness::ready, transcode::get_transcode_status,
    upload::upload_audio,
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes for k8s/systemd
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let transcoding = Router::new()
        .route(
            "/upload/audio",
            post(upload_audio).layer(DefaultBodyLimit::max(
                app_state.config.upload_max_body_bytes,
            )),
        )
        .route("/upload/image", get(upload_image).post(upload_image))
        .route("/transcode/{id}", get(get_transcode_status));

    probes.merge(transcoding)
}
