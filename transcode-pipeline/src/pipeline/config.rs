use std::{path::PathBuf, time::Duration};

use common::utils::config::AppConfig;

/// Fixed output profile of the convert stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    pub codec: String,
    pub bitrate: String,
    pub sample_rate: u32,
    pub extension: String,
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self {
            codec: "libmp3lame".into(),
            bitrate: "320k".into(),
            sample_rate: 48_000,
            extension: "mp3".into(),
        }
    }
}

/// Where the split stage writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLayout {
    /// printf-style pattern, e.g. `<workspace>/segment%03d.ts`
    pub segment_pattern: PathBuf,
    pub manifest: PathBuf,
    pub segment_duration_secs: u32,
}

#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    pub max_duration_secs: f64,
    pub segment_duration_secs: u32,
    pub target: TargetFormat,
    pub tool_timeout: Option<Duration>,
    pub remove_failed_workspaces: bool,
    pub remove_original_after_success: bool,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 610.0,
            segment_duration_secs: 5,
            target: TargetFormat::default(),
            tool_timeout: Some(Duration::from_secs(600)),
            remove_failed_workspaces: true,
            remove_original_after_success: false,
        }
    }
}

impl TranscodeConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_duration_secs: config.max_audio_duration_secs,
            segment_duration_secs: config.segment_duration_secs.max(1),
            target: TargetFormat {
                codec: config.target_codec.clone(),
                bitrate: config.target_bitrate.clone(),
                sample_rate: config.target_sample_rate,
                extension: config.target_extension.clone(),
            },
            tool_timeout: config.tool_timeout(),
            remove_failed_workspaces: config.remove_failed_workspaces,
            remove_original_after_success: config.remove_original_after_success,
        }
    }
}
