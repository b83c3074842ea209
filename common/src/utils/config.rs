use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_surrealdb_address")]
    pub surrealdb_address: String,
    #[serde(default)]
    pub surrealdb_username: Option<String>,
    #[serde(default)]
    pub surrealdb_password: Option<String>,
    #[serde(default = "default_surrealdb_namespace")]
    pub surrealdb_namespace: String,
    #[serde(default = "default_surrealdb_database")]
    pub surrealdb_database: String,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
    #[serde(default = "default_max_audio_duration_secs")]
    pub max_audio_duration_secs: f64,
    #[serde(default = "default_segment_duration_secs")]
    pub segment_duration_secs: u32,
    #[serde(default = "default_target_codec")]
    pub target_codec: String,
    #[serde(default = "default_target_bitrate")]
    pub target_bitrate: String,
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,
    #[serde(default = "default_target_extension")]
    pub target_extension: String,
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
    #[serde(default = "default_ffprobe_bin")]
    pub ffprobe_bin: String,
    /// Deadline for a single external tool call. `0` waits forever.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_true")]
    pub remove_failed_workspaces: bool,
    #[serde(default)]
    pub remove_original_after_success: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            surrealdb_address: default_surrealdb_address(),
            surrealdb_username: None,
            surrealdb_password: None,
            surrealdb_namespace: default_surrealdb_namespace(),
            surrealdb_database: default_surrealdb_database(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
            max_audio_duration_secs: default_max_audio_duration_secs(),
            segment_duration_secs: default_segment_duration_secs(),
            target_codec: default_target_codec(),
            target_bitrate: default_target_bitrate(),
            target_sample_rate: default_target_sample_rate(),
            target_extension: default_target_extension(),
            ffmpeg_bin: default_ffmpeg_bin(),
            ffprobe_bin: default_ffprobe_bin(),
            tool_timeout_secs: default_tool_timeout_secs(),
            queue_capacity: default_queue_capacity(),
            remove_failed_workspaces: true,
            remove_original_after_success: false,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Directory under which every job gets its own workspace.
    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("uploader")
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8081
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_surrealdb_address() -> String {
    "mem://".to_string()
}

fn default_surrealdb_namespace() -> String {
    "transcoder".to_string()
}

fn default_surrealdb_database() -> String {
    "status".to_string()
}

fn default_upload_max_body_bytes() -> usize {
    100 * 1024 * 1024
}

// 10 min + 10 sec buffer
fn default_max_audio_duration_secs() -> f64 {
    610.0
}

fn default_segment_duration_secs() -> u32 {
    5
}

fn default_target_codec() -> String {
    "libmp3lame".to_string()
}

fn default_target_bitrate() -> String {
    "320k".to_string()
}

fn default_target_sample_rate() -> u32 {
    48_000
}

fn default_target_extension() -> String {
    "mp3".to_string()
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_bin() -> String {
    "ffprobe".to_string()
}

fn default_tool_timeout_secs() -> u64 {
    600
}

fn default_queue_capacity() -> usize {
    1
}

fn default_true() -> bool {
    true
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
