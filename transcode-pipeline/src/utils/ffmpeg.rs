use std::{
    ffi::OsString,
    path::Path,
    process::{Output, Stdio},
};

use async_trait::async_trait;
use common::error::AppError;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::{
    pipeline::{Converter, Prober, SegmentLayout, Segmenter, TargetFormat},
    probe::AudioFormat,
};

/// Longest stderr tail carried into error messages.
const STDERR_TAIL_CHARS: usize = 800;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    nb_streams: u32,
    #[serde(default)]
    format_name: String,
    /// ffprobe reports the duration as a decimal string
    duration: Option<String>,
}

/// Parses `ffprobe -print_format json -show_format` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<AudioFormat, AppError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| AppError::Probe(format!("unexpected ffprobe output: {e}")))?;

    let raw = output
        .format
        .duration
        .ok_or_else(|| AppError::Probe("ffprobe reported no duration".to_string()))?;
    let duration_secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Probe(format!("unparseable duration '{raw}'")))?;
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(AppError::Probe(format!("invalid duration '{raw}'")));
    }

    Ok(AudioFormat {
        duration_secs,
        stream_count: output.format.nb_streams,
        container_format: output.format.format_name,
    })
}

/// Prober, converter and segmenter backed by the ffmpeg command-line tools.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegTools {
    pub fn new(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }

    pub fn probe_args(input: &Path) -> Vec<OsString> {
        vec![
            "-v".into(),
            "error".into(),
            "-i".into(),
            input.into(),
            "-print_format".into(),
            "json".into(),
            "-show_format".into(),
        ]
    }

    pub fn convert_args(input: &Path, output: &Path, target: &TargetFormat) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.into(),
            "-acodec".into(),
            target.codec.clone().into(),
            "-ar".into(),
            target.sample_rate.to_string().into(),
            "-b:a".into(),
            target.bitrate.clone().into(),
            "-y".into(),
            output.into(),
        ]
    }

    pub fn segment_args(
        input: &Path,
        layout: &SegmentLayout,
        target: &TargetFormat,
    ) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.into(),
            "-ar".into(),
            target.sample_rate.to_string().into(),
            "-b:a".into(),
            target.bitrate.clone().into(),
            "-hls_time".into(),
            layout.segment_duration_secs.to_string().into(),
            "-hls_segment_type".into(),
            "mpegts".into(),
            "-hls_list_size".into(),
            "0".into(),
            "-hls_segment_filename".into(),
            layout.segment_pattern.as_os_str().to_owned(),
            "-vn".into(),
            "-y".into(),
            layout.manifest.as_os_str().to_owned(),
        ]
    }

    async fn run(bin: &str, args: Vec<OsString>) -> std::io::Result<Output> {
        debug!(bin, ?args, "running external tool");
        Command::new(bin)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
    }
}

fn failure_message(bin: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let skip = stderr.chars().count().saturating_sub(STDERR_TAIL_CHARS);
    let tail: String = stderr.chars().skip(skip).collect();
    format!("{bin} exited with {}: {}", output.status, tail.trim())
}

#[async_trait]
impl Prober for FfmpegTools {
    async fn probe(&self, path: &Path) -> Result<AudioFormat, AppError> {
        let output = Self::run(&self.ffprobe_bin, Self::probe_args(path))
            .await
            .map_err(|e| {
                AppError::InternalError(format!("failed to start {}: {e}", self.ffprobe_bin))
            })?;

        if !output.status.success() {
            return Err(AppError::Probe(failure_message(&self.ffprobe_bin, &output)));
        }

        parse_probe_output(&output.stdout)
    }
}

#[async_trait]
impl Converter for FfmpegTools {
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        target: &TargetFormat,
    ) -> Result<(), AppError> {
        let result = Self::run(&self.ffmpeg_bin, Self::convert_args(input, output, target))
            .await
            .map_err(|e| AppError::Convert(format!("failed to start {}: {e}", self.ffmpeg_bin)))?;

        if !result.status.success() {
            return Err(AppError::Convert(failure_message(&self.ffmpeg_bin, &result)));
        }
        Ok(())
    }
}

#[async_trait]
impl Segmenter for FfmpegTools {
    async fn segment(
        &self,
        input: &Path,
        layout: &SegmentLayout,
        target: &TargetFormat,
    ) -> Result<(), AppError> {
        let result = Self::run(&self.ffmpeg_bin, Self::segment_args(input, layout, target))
            .await
            .map_err(|e| AppError::Split(format!("failed to start {}: {e}", self.ffmpeg_bin)))?;

        if !result.status.success() {
            return Err(AppError::Split(failure_message(&self.ffmpeg_bin, &result)));
        }
        Ok(())
    }
}
