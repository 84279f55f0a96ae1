use axum::http::StatusCode;
use desalink_api::ValveRejection;
use desalink_api::models::SensorFamily;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("No {0} data received")]
    EmptyPayload(SensorFamily),

    #[error("Invalid valve status, expected \"open\" or \"closed\"")]
    InvalidValveStatus,

    #[error("Invalid valve level, expected a number")]
    InvalidValveLevel,
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::EmptyPayload(_) => StatusCode::BAD_REQUEST,
            IngestError::InvalidValveStatus => StatusCode::BAD_REQUEST,
            IngestError::InvalidValveLevel => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValveRejection> for IngestError {
    fn from(rejection: ValveRejection) -> Self {
        match rejection {
            ValveRejection::InvalidStatus => IngestError::InvalidValveStatus,
            ValveRejection::InvalidLevel => IngestError::InvalidValveLevel,
        }
    }
}
