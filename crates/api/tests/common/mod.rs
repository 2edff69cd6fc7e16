#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use labflow_api::config::{OperationStoreKind, ServerConfig};
use labflow_api::router::build_app_router;
use labflow_api::state::AppState;
use labflow_core::catalog::CommandDefinition;
use labflow_core::operation::{Address, ReagentType};
use labflow_db::repositories::CommandRepo;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(operation_store: OperationStoreKind) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        operation_store,
        commands_json_path: PathBuf::from("does-not-exist.json"),
    }
}

/// Build the full application router (relational store) for `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(OperationStoreKind::Relational))
}

/// Build the full application router with an explicit configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

fn definition(
    system_name: &str,
    reagent: &str,
    average_time: i64,
    volume: i64,
    max_volume: i64,
) -> CommandDefinition {
    CommandDefinition {
        name: system_name.to_uppercase(),
        system_name: system_name.to_string(),
        reagent: ReagentType::from(reagent),
        average_time,
        volume_waste: 0,
        volume_drive_fluid: 0,
        volume_container: volume,
        max_volume,
        default_address: Address::from("A1"),
    }
}

/// Seed the catalog used across the API tests.
///
/// `cmd_a`/`cmd_b` share reagent R1 with capacity 8 (volumes 5 and 4);
/// `cmd_c` uses R2, `cmd_d` uses R3.
pub async fn seed_catalog(pool: &PgPool) {
    CommandRepo::sync(
        pool,
        &[
            definition("cmd_a", "R1", 10, 5, 8),
            definition("cmd_b", "R1", 7, 4, 8),
            definition("cmd_c", "R2", 3, 1, 8),
            definition("cmd_d", "R3", 6, 2, 10),
        ],
    )
    .await
    .unwrap();
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
