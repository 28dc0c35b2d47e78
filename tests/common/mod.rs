//! Test utilities and fixtures for Keysmith integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};
use serde_json::Value;
use tower::ServiceExt;

pub use keysmith::db::{init_db, queries, AppState};
pub use keysmith::lifecycle;
pub use keysmith::models::*;

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState for testing with an in-memory database.
///
/// Pool size 1 so every request sees the same in-memory database.
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    AppState { db: pool }
}

/// Build the full application router over a test state
pub fn test_app(state: AppState) -> Router {
    keysmith::handlers::router().with_state(state)
}

/// Insert a key record directly, bypassing the issue endpoint.
pub fn insert_test_key(
    conn: &Connection,
    key_text: &str,
    package: Option<&str>,
    created_at: i64,
    expires_at: Option<i64>,
) -> LicenseKey {
    let new = NewKey {
        key_text: key_text.to_string(),
        package: package.map(String::from),
        duration_days: 1,
        created_at,
        expires_at,
    };
    queries::insert_key(conn, &new).expect("Failed to insert test key")
}

/// Flip a key's active flag off (no endpoint exposes this).
pub fn deactivate_key(conn: &Connection, key_text: &str) {
    conn.execute(
        "UPDATE keys SET active = 0 WHERE key_text = ?1",
        params![key_text],
    )
    .expect("Failed to deactivate test key");
}

/// POST a JSON body and return the response
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// GET a path and return the response
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Consume a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response should be valid JSON")
}

/// Assert status and consume the body as JSON in one step
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
