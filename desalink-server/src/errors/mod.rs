pub mod api;
pub mod ingest;
pub mod logger;
pub mod sensor_data;
pub mod storage;

pub use api::ApiError;
pub use ingest::IngestError;
pub use logger::LoggerError;
pub use sensor_data::SensorDataError;
pub use storage::StorageError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Status code and message come from the inner error
        let (status, error_message, error_id) = match self {
            ApiError::IngestError(e) => (e.status_code(), e.to_string(), None),
            ApiError::LoggerError(e) => (e.status_code(), e.to_string(), None),
            ApiError::SensorDataError(e) => (e.status_code(), e.to_string(), None),
            ApiError::InvalidBody(e) => (e.status(), e.body_text(), None),
            ApiError::StorageError(e) => internal("Storage error", &e),
            ApiError::DatabaseError(e) => internal("Database error", &e),
            ApiError::InternalError(e) => internal("Internal error", &e),
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        // Only internal errors carry an id to correlate with the server log
        if let Some(error_id) = error_id {
            error_obj["error_id"] = json!(error_id);
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}

fn internal(kind: &str, error: &dyn std::fmt::Display) -> (StatusCode, String, Option<String>) {
    let error_id = Uuid::new_v4();
    tracing::error!(error_id = ?error_id, "{}: {}", kind, error);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
        Some(error_id.to_string()),
    )
}
