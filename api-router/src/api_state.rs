use std::sync::Arc;

use common::{storage::db::SurrealDbClient, utils::config::AppConfig};
use transcode_pipeline::{TranscodePipeline, TranscodeQueue};

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub config: AppConfig,
    pub pipeline: Arc<TranscodePipeline>,
    pub queue: TranscodeQueue,
}

impl ApiState {
    pub fn new(
        db: Arc<SurrealDbClient>,
        config: &AppConfig,
        pipeline: Arc<TranscodePipeline>,
        queue: TranscodeQueue,
    ) -> Self {
        Self {
            db,
            config: config.clone(),
            pipeline,
            queue,
        }
    }
}
