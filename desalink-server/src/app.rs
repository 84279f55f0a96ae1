use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use desalink_api::models::*;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::configs::{Recorder, SchemaManager, Settings, Storage};
use crate::errors::LoggerError;
use crate::handles::*;
use crate::models::SensorData;
use crate::repositories::SensorDataRepository;
use crate::services::{CacheService, Clock, IngestService, LoggerConfiguration, LoggerService, SystemClock};

#[derive(OpenApi)]
#[openapi(
    paths(
        ingest_temperature,
        ingest_humidity,
        ingest_water_level,
        ingest_water_weight,
        ingest_valve,
        save_cache,
        get_realtime,
        get_cache_status,
        clear_cache,
        get_logger_status,
        start_logger,
        stop_logger,
        configure_logger,
        get_sensor_data,
        delete_sensor_data,
        delete_all_sensor_data,
        delete_sensor_data_by_type,
        create_sensor_data,
        get_database_status,
        delete_sensor_data_by_sensor_id,
        delete_sensor_data_by_interval,
    ),
    components(schemas(
        IngestResponse,
        ValveResponse,
        RealtimeResponse,
        CacheStatusResponse,
        FlushResponse,
        MessageResponse,
        LoggerStartRequest,
        LoggerConfigRequest,
        LoggerStatus,
        LoggerResponse,
        DeleteResponse,
        CreateSensorDataRequest,
        DatabaseStatusResponse,
        SensorData,
    )),
    tags(
        (name = "esp32", description = "Device ingestion and realtime cache"),
        (name = "logger", description = "Background persistence control"),
        (name = "sensor", description = "Stored sensor data")
    )
)]
pub struct ApiDoc;

/// Every long-lived service of the process, wired once at boot.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<Storage>,
    pub clock: Arc<dyn Clock>,
    pub cache_service: Arc<CacheService>,
    pub ingest_service: Arc<IngestService>,
    pub logger_service: Arc<LoggerService>,
    pub sensor_data_repository: Arc<SensorDataRepository>,
}

impl AppContext {
    pub fn new(storage: Arc<Storage>, clock: Arc<dyn Clock>, recorder: &Recorder) -> Result<Self, LoggerError> {
        let sensor_data_repository = Arc::new(SensorDataRepository::new(storage.clone()));
        let cache_service = Arc::new(CacheService::new(clock.clone()));
        let ingest_service = Arc::new(IngestService::new(cache_service.clone(), clock.clone()));
        let logger_service = Arc::new(LoggerService::new(
            cache_service.clone(),
            sensor_data_repository.clone(),
            LoggerConfiguration::with_interval(recorder.interval_ms)?,
        ));

        Ok(Self {
            storage,
            clock,
            cache_service,
            ingest_service,
            logger_service,
            sensor_data_repository,
        })
    }

    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);

        Ok(Self::new(storage, Arc::new(SystemClock::new()), &settings.recorder)?)
    }

    pub fn router(&self) -> Router {
        let esp32 = esp32_router(Esp32State {
            ingest_service: self.ingest_service.clone(),
            cache_service: self.cache_service.clone(),
            logger_service: self.logger_service.clone(),
            clock: self.clock.clone(),
        });

        let logger = logger_router(LoggerState {
            logger_service: self.logger_service.clone(),
        });

        let sensors = sensor_router(SensorState {
            storage: self.storage.clone(),
            sensor_data_repository: self.sensor_data_repository.clone(),
            clock: self.clock.clone(),
        });

        Router::new()
            .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
            .merge(esp32)
            .merge(logger)
            .merge(sensors)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

pub async fn create_app(settings: &Settings) -> anyhow::Result<(AppContext, Router)> {
    let context = AppContext::from_settings(settings).await?;
    let router = context.router();

    Ok((context, router))
}
