use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use duckdb::Connection;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use duckgate::db::SessionProvider;
use duckgate::router::{GateState, gate_router};

const KEY: &str = "test-key";

fn state_for(dir: &TempDir, db_file: &str) -> GateState {
    GateState::new(
        Arc::from(KEY),
        Arc::new(SessionProvider::new(dir.path(), db_file)),
    )
}

fn seed_db(dir: &TempDir, name: &str, ddl: Option<&str>) {
    let conn = Connection::open(dir.path().join(name)).expect("create db file");
    if let Some(ddl) = ddl {
        conn.execute_batch(ddl).expect("seed db file");
    }
    conn.close().map_err(|(_, e)| e).expect("close db file");
}

fn query_request(key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}

#[tokio::test]
async fn missing_or_wrong_key_is_401_and_opens_no_session() {
    let dir = TempDir::new().unwrap();
    // Primary deliberately absent: any session open would surface as a 500,
    // so a 401 proves the auth guard short-circuits first.
    let app = gate_router(state_for(&dir, "missing.db"));

    let resp = app
        .clone()
        .oneshot(query_request(None, r#"{"sql":"SELECT 1"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(query_request(Some("wrong"), r#"{"sql":"SELECT 1"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn missing_or_blank_sql_is_400_and_executes_nothing() {
    let dir = TempDir::new().unwrap();
    // Same trick: a broken primary would turn any session open into a 500.
    let app = gate_router(state_for(&dir, "missing.db"));

    for body in ["{}", r#"{"sql":""}"#, r#"{"sql":"   "}"#, r#"{"sql":42}"#] {
        let resp = app
            .clone()
            .oneshot(query_request(Some(KEY), body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    // No body and no content-type degrades to "missing sql", not 415.
    let req = Request::builder()
        .method("POST")
        .uri("/query")
        .header("x-api-key", KEY)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn select_one_returns_shaped_result() {
    let dir = TempDir::new().unwrap();
    seed_db(&dir, "primary.db", None);
    let app = gate_router(state_for(&dir, "primary.db"));

    let resp = app
        .oneshot(query_request(Some(KEY), r#"{"sql":"SELECT 1 AS x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["rowcount"], json!(1));
    assert_eq!(body["columns"], json!(["x"]));
    assert_eq!(body["results"], json!([{"x": 1}]));
}

#[tokio::test]
async fn engine_error_is_400_and_the_server_keeps_serving() {
    let dir = TempDir::new().unwrap();
    seed_db(&dir, "primary.db", None);
    let app = gate_router(state_for(&dir, "primary.db"));

    let resp = app
        .clone()
        .oneshot(query_request(Some(KEY), r#"{"sql":"SELEC 1"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Query error:"), "message: {message}");

    let resp = app
        .oneshot(query_request(Some(KEY), r#"{"sql":"SELECT 1 AS x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unreachable_primary_is_500_connection_error() {
    let dir = TempDir::new().unwrap();
    let app = gate_router(state_for(&dir, "missing.db"));

    let resp = app
        .oneshot(query_request(Some(KEY), r#"{"sql":"SELECT 1"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "CONNECTION_ERROR");
}

#[tokio::test]
async fn health_is_ok_with_and_without_key() {
    let dir = TempDir::new().unwrap();
    let app = gate_router(state_for(&dir, "missing.db"));

    for key in [None, Some("wrong"), Some(KEY)] {
        let mut builder = Request::builder().method("GET").uri("/health");
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        let resp = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));
    }
}

#[tokio::test]
async fn attached_sibling_is_queryable_under_its_alias() {
    let dir = TempDir::new().unwrap();
    seed_db(&dir, "primary.db", None);
    seed_db(
        &dir,
        "sales.db",
        Some("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (42);"),
    );
    let app = gate_router(state_for(&dir, "primary.db"));

    let resp = app
        .oneshot(query_request(
            Some(KEY),
            r#"{"sql":"SELECT v FROM sales.t"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["results"], json!([{"v": 42}]));
}
