use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use desalink_server::app::AppContext;
use desalink_server::configs::{Database, Recorder, SchemaManager, Storage};
use desalink_server::mock::ManualClock;

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub clock: Arc<ManualClock>,
    pub context: AppContext,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = Arc::new(Storage::new(Database {
            migration_path: None,
            clean_start: true,
            url: String::from("sqlite::memory:"),
        }, SchemaManager::default()).await.unwrap());

        let clock = Arc::new(ManualClock::new());
        let context = AppContext::new(storage.clone(), clock.clone(), &Recorder::default()).unwrap();
        let router = context.router();

        Self {
            storage,
            clock,
            context,
            router,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri);

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        self.dispatch(request).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let res_body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if res_body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&res_body).unwrap()
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}
