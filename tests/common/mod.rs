#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use quillboard::config::Config;
use quillboard::routes;
use quillboard::state::AppState;
use quillboard::store::{MemoryBackend, Preset, Store};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App over an in-memory store seeded with `preset`.
    pub fn in_memory(preset: Preset) -> Self {
        let store = Store::new(Arc::new(MemoryBackend::new()), preset);
        let state = AppState::new(Arc::new(store), Config::default());
        Self::from_state(state)
    }

    /// App over a JSON file inside `dir`.
    pub fn on_disk(dir: &TempDir, preset: Preset) -> Self {
        let mut config = Config::default();
        config.store.path = Some(dir.path().join("data.json"));
        config.store.preset = preset;
        Self::from_state(AppState::from_config(config))
    }

    fn from_state(state: AppState) -> Self {
        Self {
            router: routes::router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, &[]).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body), &[]).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body), &[]).await
    }

    pub async fn delete(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("DELETE", uri, Some(body), &[]).await
    }
}
