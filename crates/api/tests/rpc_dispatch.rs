//! Integration tests for the message-call dispatcher.

mod common;

use assert_matches::assert_matches;
use common::{seed_catalog, test_config};
use labflow_api::config::OperationStoreKind;
use labflow_api::rpc::{RpcCode, RpcRouter};
use labflow_api::state::AppState;
use serde_json::json;
use sqlx::PgPool;

fn router(pool: &PgPool) -> RpcRouter {
    RpcRouter::new(AppState::new(
        pool.clone(),
        test_config(OperationStoreKind::Relational),
    ))
}

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_operation_lifecycle(pool: PgPool) {
    seed_catalog(&pool).await;
    let rpc = router(&pool);

    let created = rpc
        .handle(
            "v1.createOperation",
            &body(json!({
                "name": "Prime",
                "commands": [{ "system_name": "cmd_a", "address": "addr1" }],
            })),
        )
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();
    let binding = created["commands"][0]["id"].as_i64().unwrap();
    assert_eq!(created["average_time"], 10);

    let reply = rpc
        .handle(
            "v1.updateOperation",
            &body(json!({
                "id": id,
                "name": "Prime v2",
                "version": 1,
                "commands": [
                    { "id": binding, "system_name": "cmd_a", "address": "addr1" },
                    { "system_name": "cmd_c", "address": "addr2" },
                ],
            })),
        )
        .await
        .unwrap();
    assert_eq!(reply, json!({}));

    let fetched = rpc
        .handle("v1.getOperation", &body(json!({ "id": id })))
        .await
        .unwrap();
    assert_eq!(fetched["version"], 2);
    assert_eq!(fetched["average_time"], 13);
    assert_eq!(fetched["commands"][0]["id"], binding);

    let all = rpc.handle("v1.getOperations", b"").await.unwrap();
    assert_eq!(all[id.to_string()]["name"], "Prime v2");

    rpc.handle("v1.deleteOperation", &body(json!({ "id": id })))
        .await
        .unwrap();
    let err = rpc
        .handle("v1.getOperation", &body(json!({ "id": id })))
        .await
        .unwrap_err();
    assert_eq!(err.code, RpcCode::NotFound);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_error_codes(pool: PgPool) {
    seed_catalog(&pool).await;
    let rpc = router(&pool);

    let created = rpc
        .handle("v1.createOperation", &body(json!({ "name": "Empty", "commands": [] })))
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let stale = rpc
        .handle(
            "v1.updateOperation",
            &body(json!({ "id": id, "name": "Late", "version": 5, "commands": [] })),
        )
        .await
        .unwrap_err();
    assert_eq!(stale.code, RpcCode::Aborted);

    let unknown_command = rpc
        .handle(
            "v1.createOperation",
            &body(json!({ "name": "X", "commands": [{ "system_name": "nope", "address": "a" }] })),
        )
        .await
        .unwrap_err();
    assert_eq!(unknown_command.code, RpcCode::NotFound);

    let malformed = rpc.handle("v1.getOperation", b"not json").await.unwrap_err();
    assert_eq!(malformed.code, RpcCode::InvalidArgument);

    let invalid = rpc
        .handle("v1.createOperation", &body(json!({ "name": "", "commands": [] })))
        .await
        .unwrap_err();
    assert_eq!(invalid.code, RpcCode::InvalidArgument);

    assert_matches!(
        rpc.handle("v1.launchRocket", b"{}").await,
        Err(err) if err.code == RpcCode::InvalidArgument
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_commands(pool: PgPool) {
    seed_catalog(&pool).await;
    let commands = router(&pool).handle("v1.getCommands", b"").await.unwrap();
    assert_eq!(commands.as_array().unwrap().len(), 4);
    assert_eq!(commands[0]["system_name"], "cmd_a");
}
