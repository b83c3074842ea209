use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("Wrong content type: {0}")]
    InvalidContentType(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Workspace error: {0}")]
    Workspace(String),
    #[error("Probe error: {0}")]
    Probe(String),
    #[error("File length is too big: {duration:.2}s exceeds the {max:.2}s limit")]
    DurationExceeded { duration: f64, max: f64 },
    #[error("Convert error: {0}")]
    Convert(String),
    #[error("Split error: {0}")]
    Split(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Short machine-readable code attached to error logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::InvalidContentType(_) => "invalid_content_type",
            Self::Storage(_) => "storage",
            Self::Workspace(_) => "workspace",
            Self::Probe(_) => "probe",
            Self::DurationExceeded { .. } => "duration_exceeded",
            Self::Convert(_) => "convert",
            Self::Split(_) => "split",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::Io(_) => "io",
            Self::InternalError(_) => "internal",
        }
    }
}
