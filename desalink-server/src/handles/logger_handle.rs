use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use desalink_api::models::*;

use crate::errors::ApiError;
use crate::services::LoggerService;

#[derive(Clone)]
pub struct LoggerState {
    pub logger_service: Arc<LoggerService>,
}

pub fn logger_router(logger_state: LoggerState) -> Router {
    Router::new()
        .route("/api/logger/status", get(get_logger_status))
        .route("/api/logger/start", post(start_logger))
        .route("/api/logger/stop", post(stop_logger))
        .route("/api/logger/config", post(configure_logger))
        .with_state(logger_state)
}

#[utoipa::path(
    get,
    path = "/api/logger/status",
    tag = "logger",
    responses(
        (status = 200, description = "Current logger state", body = LoggerStatus)
    )
)]
pub async fn get_logger_status(State(state): State<LoggerState>) -> Result<Json<LoggerStatus>, ApiError> {
    Ok(Json(state.logger_service.status().await))
}

#[utoipa::path(
    post,
    path = "/api/logger/start",
    tag = "logger",
    request_body = LoggerStartRequest,
    responses(
        (status = 200, description = "Logger running", body = LoggerResponse),
        (status = 400, description = "Invalid selection or malformed body"),
        (status = 422, description = "Body does not match the request schema")
    )
)]
pub async fn start_logger(
    State(state): State<LoggerState>,
    body: Result<Json<LoggerStartRequest>, JsonRejection>,
) -> Result<Json<LoggerResponse>, ApiError> {
    // a bare start carries no body and no content type
    let body = match body {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => LoggerStartRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    // missing families fall back to `all`
    state
        .logger_service
        .set_configuration(&LoggerConfigRequest::from(body))
        .await?;

    let message = if state.logger_service.start().await {
        "Logger started"
    } else {
        "Logger already running"
    };

    Ok(Json(LoggerResponse {
        message: message.to_string(),
        status: state.logger_service.status().await,
    }))
}

#[utoipa::path(
    post,
    path = "/api/logger/stop",
    tag = "logger",
    responses(
        (status = 200, description = "Logger stopped", body = LoggerResponse)
    )
)]
pub async fn stop_logger(State(state): State<LoggerState>) -> Result<Json<LoggerResponse>, ApiError> {
    let message = if state.logger_service.stop().await {
        "Logger stopped"
    } else {
        "Logger already stopped"
    };

    Ok(Json(LoggerResponse {
        message: message.to_string(),
        status: state.logger_service.status().await,
    }))
}

#[utoipa::path(
    post,
    path = "/api/logger/config",
    tag = "logger",
    request_body = LoggerConfigRequest,
    responses(
        (status = 200, description = "Configuration applied", body = LoggerResponse),
        (status = 400, description = "Empty request, zero interval or invalid selection")
    )
)]
pub async fn configure_logger(
    State(state): State<LoggerState>,
    Json(body): Json<LoggerConfigRequest>,
) -> Result<Json<LoggerResponse>, ApiError> {
    state.logger_service.set_configuration(&body).await?;

    Ok(Json(LoggerResponse {
        message: "Configuration updated".to_string(),
        status: state.logger_service.status().await,
    }))
}
