use axum::extract::rejection::JsonRejection;

use super::{IngestError, LoggerError, SensorDataError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),

    #[error("Logger error: {0}")]
    LoggerError(#[from] LoggerError),

    #[error("Sensor data error: {0}")]
    SensorDataError(#[from] SensorDataError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
