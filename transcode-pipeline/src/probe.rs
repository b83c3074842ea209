use std::{path::PathBuf, time::Duration};

use common::error::AppError;
use serde::Serialize;

use crate::{pipeline::Prober, utils::deadline::with_deadline};

/// Metadata reported by the probe tool for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFormat {
    pub duration_secs: f64,
    pub stream_count: u32,
    pub container_format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeState {
    Unprobed,
    Probed(AudioFormat),
}

/// A media file on disk together with its lazily probed format.
///
/// The first successful `format` call invokes the prober; later calls on the
/// same handle return the stored metadata. A failed probe leaves the handle
/// unprobed.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    path: PathBuf,
    state: ProbeState,
}

impl AudioArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: ProbeState::Unprobed,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    pub fn is_probed(&self) -> bool {
        matches!(self.state, ProbeState::Probed(_))
    }

    pub async fn format(
        &mut self,
        prober: &dyn Prober,
        limit: Option<Duration>,
    ) -> Result<&AudioFormat, AppError> {
        if let ProbeState::Unprobed = self.state {
            let format = with_deadline(limit, prober.probe(&self.path), |limit| {
                AppError::InternalError(format!(
                    "probing {} timed out after {}s",
                    self.path.display(),
                    limit.as_secs()
                ))
            })
            .await?;
            self.state = ProbeState::Probed(format);
        }

        match &self.state {
            ProbeState::Probed(format) => Ok(format),
            ProbeState::Unprobed => Err(AppError::InternalError(
                "probe state not recorded".to_string(),
            )),
        }
    }

    pub async fn duration(
        &mut self,
        prober: &dyn Prober,
        limit: Option<Duration>,
    ) -> Result<f64, AppError> {
        Ok(self.format(prober, limit).await?.duration_secs)
    }
}
