use std::sync::Arc;

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use desalink_api::models::*;
use serde_json::Value;

use crate::errors::ApiError;
use crate::services::{CACHE_TTL, CacheService, Clock, IngestService, LoggerService};

#[derive(Clone)]
pub struct Esp32State {
    pub ingest_service: Arc<IngestService>,
    pub cache_service: Arc<CacheService>,
    pub logger_service: Arc<LoggerService>,
    pub clock: Arc<dyn Clock>,
}

pub fn esp32_router(esp32_state: Esp32State) -> Router {
    Router::new()
        .route("/api/esp32/temperature", post(ingest_temperature))
        .route("/api/esp32/humidity", post(ingest_humidity))
        .route("/api/esp32/waterlevel", post(ingest_water_level))
        .route("/api/esp32/waterweight", post(ingest_water_weight))
        .route("/api/esp32/valve", post(ingest_valve))
        .route("/api/esp32/save", post(save_cache))
        .route("/api/esp32/realtime", get(get_realtime))
        .route("/api/esp32/status", get(get_cache_status))
        .route("/api/esp32/cache", delete(clear_cache))
        .with_state(esp32_state)
}

async fn ingest(state: &Esp32State, family: SensorFamily, body: &Value) -> Result<Json<IngestResponse>, ApiError> {
    let response = state.ingest_service.ingest_batch(family, body).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/esp32/temperature",
    tag = "esp32",
    responses(
        (status = 200, description = "Batch accepted, possibly with rejected entries", body = IngestResponse),
        (status = 400, description = "Empty payload")
    )
)]
pub async fn ingest_temperature(
    State(state): State<Esp32State>,
    Json(body): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    ingest(&state, SensorFamily::Temperature, &body).await
}

#[utoipa::path(
    post,
    path = "/api/esp32/humidity",
    tag = "esp32",
    responses(
        (status = 200, description = "Batch accepted, possibly with rejected entries", body = IngestResponse),
        (status = 400, description = "Empty payload")
    )
)]
pub async fn ingest_humidity(
    State(state): State<Esp32State>,
    Json(body): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    ingest(&state, SensorFamily::Humidity, &body).await
}

#[utoipa::path(
    post,
    path = "/api/esp32/waterlevel",
    tag = "esp32",
    responses(
        (status = 200, description = "Batch accepted, possibly with rejected entries", body = IngestResponse),
        (status = 400, description = "Empty payload")
    )
)]
pub async fn ingest_water_level(
    State(state): State<Esp32State>,
    Json(body): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    ingest(&state, SensorFamily::WaterLevel, &body).await
}

#[utoipa::path(
    post,
    path = "/api/esp32/waterweight",
    tag = "esp32",
    responses(
        (status = 200, description = "Batch accepted, possibly with rejected entries", body = IngestResponse),
        (status = 400, description = "Empty payload")
    )
)]
pub async fn ingest_water_weight(
    State(state): State<Esp32State>,
    Json(body): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    ingest(&state, SensorFamily::WaterWeight, &body).await
}

#[utoipa::path(
    post,
    path = "/api/esp32/valve",
    tag = "esp32",
    responses(
        (status = 200, description = "Valve state replaced", body = ValveResponse),
        (status = 400, description = "Invalid status or level")
    )
)]
pub async fn ingest_valve(
    State(state): State<Esp32State>,
    Json(body): Json<Value>,
) -> Result<Json<ValveResponse>, ApiError> {
    let response = state.ingest_service.ingest_valve(&body).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/esp32/save",
    tag = "esp32",
    responses(
        (status = 200, description = "Cached readings written to storage", body = FlushResponse)
    )
)]
pub async fn save_cache(State(state): State<Esp32State>) -> Result<Json<FlushResponse>, ApiError> {
    let report = state.logger_service.flush_cache().await;

    let message = match report.failed {
        0 => format!("Saved {} readings", report.saved),
        failed => format!("Saved {} readings, {} failed", report.saved, failed),
    };

    Ok(Json(FlushResponse {
        success: report.failed == 0,
        message,
        saved_count: report.saved,
        failed_count: report.failed,
        timestamp: state.clock.now_utc(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/esp32/realtime",
    tag = "esp32",
    responses(
        (status = 200, description = "Latest reading of every sensor with liveness", body = RealtimeResponse)
    )
)]
pub async fn get_realtime(State(state): State<Esp32State>) -> Result<Json<RealtimeResponse>, ApiError> {
    let snapshot = state.cache_service.snapshot(CACHE_TTL).await;

    Ok(Json(snapshot.to_realtime()))
}

#[utoipa::path(
    get,
    path = "/api/esp32/status",
    tag = "esp32",
    responses(
        (status = 200, description = "Cache occupancy and uptime", body = CacheStatusResponse)
    )
)]
pub async fn get_cache_status(State(state): State<Esp32State>) -> Result<Json<CacheStatusResponse>, ApiError> {
    Ok(Json(CacheStatusResponse {
        status: "online".to_string(),
        cache: state.cache_service.stats().await,
        last_update: state.cache_service.last_update().await,
        uptime: state.clock.monotonic().as_secs(),
        timestamp: state.clock.now_utc(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/esp32/cache",
    tag = "esp32",
    responses(
        (status = 200, description = "Sensor maps emptied, valve kept", body = MessageResponse)
    )
)]
pub async fn clear_cache(State(state): State<Esp32State>) -> Result<Json<MessageResponse>, ApiError> {
    state.cache_service.clear().await;

    tracing::info!("realtime cache cleared");

    Ok(Json(MessageResponse {
        success: true,
        message: "Cache cleared".to_string(),
    }))
}
