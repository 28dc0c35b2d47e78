use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::db::{queries, AppState};
use crate::error::Result;
use crate::extractors::Json;
use crate::lifecycle;
use crate::models::{
    IssueKeyRequest, IssuedKeyResponse, KeyRecord, VerifyRequest, VerifyResponse,
};

/// POST /api/keys - issue a new license key.
pub async fn issue_key(
    State(state): State<AppState>,
    Json(req): Json<IssueKeyRequest>,
) -> Result<Json<IssuedKeyResponse>> {
    let conn = state.db.get()?;
    let key = lifecycle::issue_key(&conn, req.package_name, req.duration_days.as_ref())?;
    tracing::info!("Issued key {} for package {:?}", key.id, key.package);
    Ok(Json(key.into()))
}

/// GET /api/keys - list all keys, newest first.
pub async fn list_keys(State(state): State<AppState>) -> Result<Json<Vec<KeyRecord>>> {
    let conn = state.db.get()?;
    let keys = queries::list_keys(&conn)?;
    Ok(Json(keys.into_iter().map(KeyRecord::from).collect()))
}

/// GET /api/keys/download - list payload served as a file attachment.
pub async fn download_keys(State(state): State<AppState>) -> Result<Response> {
    let conn = state.db.get()?;
    let keys = queries::list_keys(&conn)?;
    let records: Vec<KeyRecord> = keys.into_iter().map(KeyRecord::from).collect();
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=keys.json",
        )],
        Json(records),
    )
        .into_response())
}

/// POST /api/keys/verify - classify a key's validity.
///
/// A missing or empty key is answered inline with the `{valid, message}`
/// envelope (400) without touching the store.
pub async fn verify_key(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Response> {
    let key = req.key.as_deref().unwrap_or("");
    if key.is_empty() {
        let body = VerifyResponse {
            valid: false,
            message: "No key provided".to_string(),
            package: None,
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let conn = state.db.get()?;
    let record = queries::get_key_by_text(&conn, key)?;
    let verdict = lifecycle::classify(record.as_ref(), Utc::now().timestamp());

    let package = if verdict.is_valid() {
        record.and_then(|r| r.package)
    } else {
        None
    };

    Ok(Json(VerifyResponse {
        valid: verdict.is_valid(),
        message: verdict.message().to_string(),
        package,
    })
    .into_response())
}
