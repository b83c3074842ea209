use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Identity of one upload, unique across the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| AppError::Validation(format!("invalid job id '{s}': {e}")))
    }
}

/// Root directory holding one subdirectory per job.
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
    root: PathBuf,
}

impl WorkspaceRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of the job's directory without touching the filesystem.
    pub fn dir_for(&self, id: &JobId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Creates the job's directory (and any missing parents). Idempotent.
    pub async fn workspace_for(&self, id: &JobId) -> Result<PathBuf, AppError> {
        let dir = self.dir_for(id);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Workspace(format!("creating {}: {e}", dir.display()))
        })?;
        debug!(job_id = %id, path = %dir.display(), "workspace ready");
        Ok(dir)
    }

    /// Best-effort removal of the job's directory.
    pub async fn remove(&self, id: &JobId) {
        let dir = self.dir_for(id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => debug!(job_id = %id, "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(job_id = %id, error = %e, "failed to remove workspace"),
        }
    }
}
