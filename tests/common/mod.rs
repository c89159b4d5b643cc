//! Common test helpers for integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{create_test_app_state, pool_house};
//! ```
//!
//! # Note
//!
//! Each integration test file compiles as its own crate, so helpers used by
//! only one file would otherwise warn as dead code in the others.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;

use villa_api::api::{AppState, VillaCreateDto, VillaDto, create_villa};
use villa_api::infrastructure::InMemoryVillaRepository;

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by an empty in-memory store.
pub fn create_test_app_state() -> AppState {
    AppState {
        villa_repository: Arc::new(InMemoryVillaRepository::new()),
    }
}

// =============================================================================
// Test Data
// =============================================================================

/// The villa used throughout the scenario tests.
pub fn pool_house() -> VillaCreateDto {
    villa_named("Pool House")
}

/// A valid creation body with the given name.
pub fn villa_named(name: &str) -> VillaCreateDto {
    VillaCreateDto {
        id: None,
        name: name.to_string(),
        details: None,
        rate: 100.0,
        sqft: 500,
        occupancy: 2,
        image_url: None,
        amenity: None,
    }
}

/// Creates a villa through the handler and returns the stored transfer shape.
pub async fn create_and_return(state: &AppState, request: VillaCreateDto) -> VillaDto {
    let (_, _, Json(villa)) = create_villa(State(state.clone()), Ok(Json(request)))
        .await
        .expect("villa should be created");
    villa
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Builds a request with a JSON body.
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Builds a request without a body.
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

/// Collects a response body as JSON, or `Value::Null` when it is empty.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }
}
