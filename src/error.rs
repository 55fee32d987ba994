// Augment Free Error Types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Backup failed for {}: {reason}", path.display())]
    BackupFailed { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database inconsistency: {0}")]
    Engine(String),

    #[error("Restore from {} failed: {reason}", backup.display())]
    RestoreFailed { backup: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Path discovery failed: {0}")]
    PathDiscovery(String),

    #[error("Process control failed: {0}")]
    Process(String),
}

impl MaintenanceError {
    /// Short machine-readable kind, used in reports and events.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MaintenanceError::NotFound(_) => ErrorKind::NotFound,
            MaintenanceError::BackupFailed { .. } => ErrorKind::BackupFailed,
            MaintenanceError::Parse(_) => ErrorKind::ParseError,
            MaintenanceError::Database(_) | MaintenanceError::Engine(_) => ErrorKind::EngineError,
            MaintenanceError::RestoreFailed { .. } => ErrorKind::RestoreFailed,
            MaintenanceError::Io(_) => ErrorKind::Io,
            MaintenanceError::InvalidInput(_) => ErrorKind::InvalidInput,
            MaintenanceError::PathDiscovery(_) | MaintenanceError::Process(_) => ErrorKind::Environment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    BackupFailed,
    ParseError,
    EngineError,
    RestoreFailed,
    Io,
    InvalidInput,
    Environment,
}

pub type Result<T> = std::result::Result<T, MaintenanceError>;
