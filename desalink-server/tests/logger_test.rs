use axum::http::StatusCode;
use serde_json::json;

use crate::common::mock_app::MockApp;

mod common;

#[tokio::test]
async fn test_cycle_persists_only_valid_reading() {
    let app = MockApp::new().await;

    app.post("/api/esp32/temperature", json!({ "T1": 25.5, "T16": 999 }))
        .await;

    let (status, _) = app
        .post("/api/logger/config", json!({ "interval": 5000, "temperature": "all" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let report = app.context.logger_service.run_cycle().await.unwrap();
    assert_eq!(report.persisted, 1);
    assert_eq!(report.failed, 0);

    let (status, records) = app.get("/api/sensors").await;
    assert_eq!(status, StatusCode::OK);

    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["sensor_id"], "T1");
    assert_eq!(records[0]["sensor_type"], "temperature");
    assert_eq!(records[0]["value"], 25.5);
    assert_eq!(records[0]["unit"], "°C");
    assert_eq!(records[0]["status"], "active");
    assert_eq!(records[0]["interval_seconds"], 5);

    let (_, status) = app.get("/api/logger/status").await;
    assert_eq!(status["logCount"], 1);
}

#[tokio::test]
async fn test_start_and_stop() {
    let app = MockApp::new().await;

    let (_, status) = app.get("/api/logger/status").await;
    assert_eq!(status["isLogging"], false);
    assert_eq!(status["interval"], 5000);
    assert_eq!(status["selection"]["temperature"], "all");

    let (status, body) = app.post("/api/logger/start", json!({ "humidity": false })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logger started");
    assert_eq!(body["status"]["isLogging"], true);
    assert_eq!(body["status"]["enabledSensorTypes"]["humidity"], false);
    assert_eq!(body["status"]["selection"]["waterWeight"], "all");

    let (_, body) = app.post("/api/logger/start", json!({})).await;
    assert_eq!(body["message"], "Logger already running");
    assert_eq!(body["status"]["selection"]["humidity"], "all");

    let (status, body) = app.post("/api/logger/stop", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logger stopped");
    assert_eq!(body["status"]["isLogging"], false);

    let (_, body) = app.post("/api/logger/stop", json!({})).await;
    assert_eq!(body["message"], "Logger already stopped");
}

#[tokio::test]
async fn test_start_without_body() {
    let app = MockApp::new().await;

    let (status, body) = app
        .send(axum::http::Method::POST, "/api/logger/start", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["isLogging"], true);

    app.context.logger_service.stop().await;
}

#[tokio::test]
async fn test_start_with_malformed_selection_keeps_configuration() {
    let app = MockApp::new().await;

    app.post("/api/logger/config", json!({ "temperature": "T5" })).await;

    let (status, body) = app.post("/api/logger/start", json!({ "temperature": 5 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 422);

    let (status, _) = app
        .send_raw(axum::http::Method::POST, "/api/logger/start", "application/json", "{not json")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/logger/start", json!({ "waterLevel": "all" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("waterLevel"));

    let (_, status) = app.get("/api/logger/status").await;
    assert_eq!(status["isLogging"], false);
    assert_eq!(status["selection"]["temperature"], "T5");
}

#[tokio::test]
async fn test_single_sensor_selection_is_idempotent() {
    let app = MockApp::new().await;

    let (_, first) = app.post("/api/logger/config", json!({ "temperature": "T5" })).await;
    let (_, second) = app.post("/api/logger/config", json!({ "temperature": "T5" })).await;

    assert_eq!(first["status"], second["status"]);
    assert_eq!(second["status"]["selection"]["temperature"], "T5");
    assert_eq!(second["status"]["activeSensors"]["temperature"], json!(["T5"]));
}

#[tokio::test]
async fn test_selection_none_writes_nothing() {
    let app = MockApp::new().await;

    app.post("/api/esp32/humidity", json!({ "RH1": 40.0, "RH2": 41.0 }))
        .await;
    app.post("/api/logger/config", json!({ "humidity": "none" })).await;

    let report = app.context.logger_service.run_cycle().await.unwrap();
    assert_eq!(report.persisted, 0);

    let (_, records) = app.get("/api/sensors?sensor_type=humidity").await;
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_configuration() {
    let app = MockApp::new().await;

    let (status, body) = app.post("/api/logger/config", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No valid configuration provided");

    let (status, _) = app.post("/api/logger/config", json!({ "interval": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/logger/config", json!({ "temperature": "RH1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/logger/config", json!({ "waterLevel": "all" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Sensor type waterLevel is realtime only and cannot be logged"
    );

    let (status, _) = app.post("/api/logger/config", json!({ "interval": 86_400_001 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app.get("/api/logger/status").await;
    assert_eq!(status["interval"], 5000);
    assert_eq!(status["selection"]["temperature"], "all");
}

#[tokio::test]
async fn test_interval_change_keeps_counter() {
    let app = MockApp::new().await;

    app.context.logger_service.run_cycle().await.unwrap();

    let (status, body) = app.post("/api/logger/config", json!({ "interval": 2000 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["interval"], 2000);
    assert_eq!(body["status"]["logCount"], 1);
}
