use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use common::{error::AppError, utils::config::AppConfig};

use super::config::{SegmentLayout, TargetFormat};
use crate::{probe::AudioFormat, utils::ffmpeg::FfmpegTools};

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<AudioFormat, AppError>;
}

#[async_trait]
pub trait Converter: Send + Sync {
    /// Re-encodes `input` into `output` with the fixed target profile.
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        target: &TargetFormat,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Cuts `input` into fixed-length segments plus a manifest as described by `layout`.
    async fn segment(
        &self,
        input: &Path,
        layout: &SegmentLayout,
        target: &TargetFormat,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct TranscodeServices {
    pub prober: Arc<dyn Prober>,
    pub converter: Arc<dyn Converter>,
    pub segmenter: Arc<dyn Segmenter>,
}

impl TranscodeServices {
    pub fn new(
        prober: Arc<dyn Prober>,
        converter: Arc<dyn Converter>,
        segmenter: Arc<dyn Segmenter>,
    ) -> Self {
        Self {
            prober,
            converter,
            segmenter,
        }
    }

    /// All three capabilities backed by the ffmpeg/ffprobe binaries from the config.
    pub fn ffmpeg(config: &AppConfig) -> Self {
        let tools = Arc::new(FfmpegTools::new(&config.ffmpeg_bin, &config.ffprobe_bin));
        Self {
            prober: Arc::<FfmpegTools>::clone(&tools),
            converter: Arc::<FfmpegTools>::clone(&tools),
            segmenter: tools,
        }
    }
}
