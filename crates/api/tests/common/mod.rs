//! Common test utilities for integration tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! the in-memory record store, so no database is required.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use domain::services::InMemoryMessageStore;
use event_messaging_api::{app::create_app, config::Config};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Configuration backed by the in-memory store.
pub fn test_config() -> Config {
    Config::from_overrides(&[("messaging.store", "memory"), ("logging.format", "pretty")])
        .expect("Failed to build test config")
}

/// Application router sharing `store` with the test.
pub fn test_app(store: &InMemoryMessageStore) -> Router {
    create_app(test_config(), Arc::new(store.clone()))
}

/// Send a request and decode the JSON response body (`Value::Null` if empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}
