use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use desalink_api::SensorId;
use desalink_api::models::{
    CreateSensorDataRequest, DatabaseStatusResponse, DeleteResponse, SensorDataQuery, SensorFamily, SensorStatus,
};

use crate::configs::Storage;
use crate::errors::{ApiError, SensorDataError};
use crate::models::{NewSensorData, SensorData};
use crate::repositories::SensorDataRepository;
use crate::services::Clock;

#[derive(Clone)]
pub struct SensorState {
    pub storage: Arc<Storage>,
    pub sensor_data_repository: Arc<SensorDataRepository>,
    pub clock: Arc<dyn Clock>,
}

pub fn sensor_router(sensor_state: SensorState) -> Router {
    Router::new()
        .route(
            "/api/sensors",
            get(get_sensor_data)
                .post(create_sensor_data)
                .delete(delete_all_sensor_data),
        )
        .route("/api/sensors/status", get(get_database_status))
        .route("/api/sensors/:id", delete(delete_sensor_data))
        .route("/api/sensors/sensor/:sensor_id", delete(delete_sensor_data_by_sensor_id))
        .route("/api/sensors/type/:sensor_type", delete(delete_sensor_data_by_type))
        .route("/api/sensors/interval/:interval", delete(delete_sensor_data_by_interval))
        .with_state(sensor_state)
}

// `all` and empty strings disable a filter
fn filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|value| !value.is_empty() && *value != "all")
}

fn parse_family(raw: &str) -> Result<SensorFamily, SensorDataError> {
    raw.parse::<SensorFamily>()
        .map_err(|_| SensorDataError::UnknownSensorType(raw.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/sensors",
    tag = "sensor",
    params(SensorDataQuery),
    responses(
        (status = 200, description = "Stored readings", body = [SensorData]),
        (status = 400, description = "Unknown sensor type or half-open time range"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_sensor_data(
    State(state): State<SensorState>,
    Query(query): Query<SensorDataQuery>,
) -> Result<Json<Vec<SensorData>>, ApiError> {
    let limit = query.limit();
    let repository = &state.sensor_data_repository;

    let records = if let Some(sensor_id) = filter(&query.sensor_id) {
        repository.find_by_sensor_id(sensor_id, limit).await?
    } else if let Some(sensor_type) = filter(&query.sensor_type) {
        let family = parse_family(sensor_type)?;
        repository.find_by_sensor_type(family.as_str(), limit).await?
    } else {
        match (query.start, query.end) {
            (Some(start), Some(end)) => repository.find_by_time_range(start, end, limit).await?,
            (None, None) => repository.find_latest(limit).await?,
            _ => return Err(SensorDataError::IncompleteTimeRange.into()),
        }
    };

    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/api/sensors",
    tag = "sensor",
    request_body = CreateSensorDataRequest,
    responses(
        (status = 201, description = "Record stored", body = SensorData),
        (status = 400, description = "Missing field, unknown type or invalid identifier"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_sensor_data(
    State(state): State<SensorState>,
    Json(body): Json<CreateSensorDataRequest>,
) -> Result<(StatusCode, Json<SensorData>), ApiError> {
    let raw_id = body.sensor_id.as_deref().ok_or(SensorDataError::MissingField("sensor_id"))?;
    let raw_type = body.sensor_type.as_deref().ok_or(SensorDataError::MissingField("sensor_type"))?;
    let value = body.value.ok_or(SensorDataError::MissingField("value"))?;

    let family = parse_family(raw_type)?;
    if !family.is_persistable() {
        return Err(SensorDataError::NotPersistable(family).into());
    }

    let sensor_id = SensorId::parse(family, raw_id)
        .map_err(|_| SensorDataError::InvalidSensorId(raw_id.to_string()))?;

    let mut record = NewSensorData::new(
        sensor_id,
        value,
        body.status.unwrap_or(SensorStatus::Active),
        body.interval,
        body.time.unwrap_or_else(|| state.clock.now_utc()),
    );
    if let Some(unit) = body.unit.filter(|unit| !unit.is_empty()) {
        record = record.with_unit(unit);
    }

    let mut tx = state.storage.get_pool().begin().await?;
    let stored = state.sensor_data_repository.create(&record, &mut tx).await?;
    tx.commit().await?;

    tracing::info!(sensor_id = %stored.sensor_id, id = stored.id, "sensor data created");

    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    get,
    path = "/api/sensors/status",
    tag = "sensor",
    responses(
        (status = 200, description = "Stored data summary", body = DatabaseStatusResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_database_status(State(state): State<SensorState>) -> Result<Json<DatabaseStatusResponse>, ApiError> {
    let repository = &state.sensor_data_repository;

    let records_by_type = repository.count_by_sensor_type().await?.into_iter().collect::<BTreeMap<_, _>>();
    let oldest = repository.find_oldest().await?;
    let newest = repository.find_latest(1).await?.pop();

    Ok(Json(DatabaseStatusResponse {
        total_records: records_by_type.values().sum(),
        records_by_type,
        oldest_record: oldest.map(|record| record.time),
        newest_record: newest.map(|record| record.time),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/sensors/{id}",
    tag = "sensor",
    params(
        ("id" = i64, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record deleted", body = DeleteResponse),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_sensor_data(
    State(state): State<SensorState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut tx = state.storage.get_pool().begin().await?;
    let deleted = state.sensor_data_repository.delete(id, &mut tx).await?;
    tx.commit().await?;

    if deleted == 0 {
        return Err(SensorDataError::NotFound.into());
    }

    Ok(Json(DeleteResponse {
        message: "Data deleted successfully".to_string(),
        deleted,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/sensors",
    tag = "sensor",
    responses(
        (status = 200, description = "Every record deleted", body = DeleteResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_all_sensor_data(State(state): State<SensorState>) -> Result<Json<DeleteResponse>, ApiError> {
    let mut tx = state.storage.get_pool().begin().await?;
    let deleted = state.sensor_data_repository.delete_all(&mut tx).await?;
    tx.commit().await?;

    tracing::info!(deleted, "all sensor data deleted");

    Ok(Json(DeleteResponse {
        message: format!("Deleted {deleted} records"),
        deleted,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/sensors/type/{sensor_type}",
    tag = "sensor",
    params(
        ("sensor_type" = String, Path, description = "temperature, humidity or waterWeight")
    ),
    responses(
        (status = 200, description = "Records of the type deleted", body = DeleteResponse),
        (status = 400, description = "Unknown sensor type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_sensor_data_by_type(
    State(state): State<SensorState>,
    Path(sensor_type): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let family = parse_family(&sensor_type)?;

    let mut tx = state.storage.get_pool().begin().await?;
    let deleted = state
        .sensor_data_repository
        .delete_by_sensor_type(family.as_str(), &mut tx)
        .await?;
    tx.commit().await?;

    tracing::info!(%family, deleted, "sensor data deleted by type");

    Ok(Json(DeleteResponse {
        message: format!("Deleted {deleted} {family} records"),
        deleted,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/sensors/sensor/{sensor_id}",
    tag = "sensor",
    params(
        ("sensor_id" = String, Path, description = "Sensor identifier such as T5")
    ),
    responses(
        (status = 200, description = "Records of the sensor deleted", body = DeleteResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_sensor_data_by_sensor_id(
    State(state): State<SensorState>,
    Path(sensor_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut tx = state.storage.get_pool().begin().await?;
    let deleted = state
        .sensor_data_repository
        .delete_by_sensor_id(&sensor_id, &mut tx)
        .await?;
    tx.commit().await?;

    tracing::info!(%sensor_id, deleted, "sensor data deleted by sensor");

    Ok(Json(DeleteResponse {
        message: format!("Deleted {deleted} records of sensor {sensor_id}"),
        deleted,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/sensors/interval/{interval}",
    tag = "sensor",
    params(
        ("interval" = u32, Path, description = "Logger interval in whole seconds")
    ),
    responses(
        (status = 200, description = "Records logged at the interval deleted", body = DeleteResponse),
        (status = 400, description = "Invalid interval"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_sensor_data_by_interval(
    State(state): State<SensorState>,
    Path(interval): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let interval_seconds = interval
        .parse::<u32>()
        .map_err(|_| SensorDataError::InvalidInterval(interval.clone()))?;

    let mut tx = state.storage.get_pool().begin().await?;
    let deleted = state
        .sensor_data_repository
        .delete_by_interval(interval_seconds, &mut tx)
        .await?;
    tx.commit().await?;

    tracing::info!(interval_seconds, deleted, "sensor data deleted by interval");

    Ok(Json(DeleteResponse {
        message: format!("Deleted {deleted} records logged every {interval_seconds}s"),
        deleted,
    }))
}
