use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    storage::{db::SurrealDbClient, workspace::JobId},
};

pub const KEY_PREFIX: &str = "transcoder/";

/// Pipeline milestones as they appear in the status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Queued,
    Probed,
    Converted,
    Split,
    Completed,
    Failed,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Queued => "queued",
            JobPhase::Probed => "probed",
            JobPhase::Converted => "converted",
            JobPhase::Split => "split",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
        }
    }

    /// Coarse progress for the phase. `Failed` freezes whatever was reached.
    pub fn percentage(&self) -> Option<u8> {
        match self {
            JobPhase::Queued | JobPhase::Probed => Some(0),
            JobPhase::Converted => Some(33),
            JobPhase::Split => Some(66),
            JobPhase::Completed => Some(100),
            JobPhase::Failed => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscodeStatus {
    pub percentage: u8,
    pub status: String,
}

pub fn key(id: &JobId) -> String {
    format!("{KEY_PREFIX}{id}")
}

impl TranscodeStatus {
    pub fn new(phase: JobPhase, percentage: u8) -> Self {
        Self {
            percentage,
            status: phase.as_str().to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobPhase::Failed.as_str()
    }

    /// Registers a fresh `{0, "queued"}` record. A second create for the same id fails.
    pub async fn create(id: &JobId, db: &SurrealDbClient) -> Result<TranscodeStatus, AppError> {
        let key = key(id);
        if db.kv_has(key.as_bytes()).await? {
            return Err(AppError::AlreadyExists(format!("status record for job {id}")));
        }

        let record = TranscodeStatus::new(JobPhase::Queued, 0);
        db.kv_set(key.as_bytes(), encode(&record)?).await?;
        Ok(record)
    }

    pub async fn update(
        id: &JobId,
        record: &TranscodeStatus,
        db: &SurrealDbClient,
    ) -> Result<(), AppError> {
        let key = key(id);
        if !db.kv_has(key.as_bytes()).await? {
            return Err(not_found(id));
        }

        db.kv_set(key.as_bytes(), encode(record)?).await
    }

    /// Sets the percentage of an existing record, keeping its label.
    pub async fn increment_percentage(
        id: &JobId,
        value: u8,
        db: &SurrealDbClient,
    ) -> Result<TranscodeStatus, AppError> {
        let mut record = Self::get(id, db).await?;
        record.percentage = value;
        db.kv_set(key(id).as_bytes(), encode(&record)?).await?;
        Ok(record)
    }

    pub async fn get(id: &JobId, db: &SurrealDbClient) -> Result<TranscodeStatus, AppError> {
        let bytes = db
            .kv_get(key(id).as_bytes())
            .await?
            .ok_or_else(|| not_found(id))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Decode(format!("status record for job {id}: {e}")))
    }

    /// Moves the record to the phase the pipeline just reached.
    pub async fn advance(
        id: &JobId,
        phase: JobPhase,
        db: &SurrealDbClient,
    ) -> Result<TranscodeStatus, AppError> {
        let current = Self::get(id, db).await?;
        let percentage = phase
            .percentage()
            .map_or(current.percentage, |p| p.max(current.percentage));
        let record = TranscodeStatus::new(phase, percentage);
        Self::update(id, &record, db).await?;
        Ok(record)
    }

    /// Labels the job failed without moving its percentage.
    pub async fn mark_failed(id: &JobId, db: &SurrealDbClient) -> Result<TranscodeStatus, AppError> {
        Self::advance(id, JobPhase::Failed, db).await
    }
}

fn encode(record: &TranscodeStatus) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(record).map_err(|e| AppError::InternalError(e.to_string()))
}

fn not_found(id: &JobId) -> AppError {
    AppError::NotFound(format!("status record for job {id}"))
}
