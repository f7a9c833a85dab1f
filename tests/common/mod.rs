#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use academia_api::{api, config::AppConfig, storage::RelationalBackend, AppState};

/// Helper harness spinning up the full router backed by a file-based SQLite
/// database inside a temporary directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _tmp: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh, seeded database state.
    pub async fn new() -> Self {
        Self::with_seed(true).await
    }

    /// Construct a test application, optionally skipping seed data.
    pub async fn with_seed(seed: bool) -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let db_path = tmp.path().join("academia_test.db");

        let cfg = AppConfig {
            database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
            data_file: tmp
                .path()
                .join("academia_data.json")
                .display()
                .to_string(),
            seed_data: seed,
            ..AppConfig::default()
        };

        let backend = RelationalBackend::connect(&cfg)
            .await
            .expect("sqlite backend");
        let state = AppState::new(Arc::new(backend), cfg);
        let router = api::routes().with_state(state.clone());

        Self {
            router,
            state,
            _tmp: tmp,
        }
    }

    /// The assembled router, for tests that need to craft raw requests.
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Response {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> Response {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.request(Method::DELETE, path, None).await
    }

    /// Post a multipart upload with a single `file` field.
    pub async fn upload(&self, filename: &str, content: &[u8]) -> Response {
        const BOUNDARY: &str = "test-upload-boundary";

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("response")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
