use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A stored license key record.
///
/// Timestamps are unix seconds (UTC). `expires_at` of `None` means the
/// key never expires. `active` is the administrative kill-switch; it
/// defaults to true and no endpoint currently mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseKey {
    pub id: i64,
    pub key_text: String,
    pub package: Option<String>,
    pub duration_days: i64,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub active: bool,
}

/// Fields for a key record about to be inserted (id is store-assigned).
#[derive(Debug, Clone)]
pub struct NewKey {
    pub key_text: String,
    pub package: Option<String>,
    pub duration_days: i64,
    pub created_at: i64,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueKeyRequest {
    pub package_name: Option<String>,
    /// Accepted as a raw JSON value: clients send numbers or strings.
    /// Normalized in the lifecycle layer; anything unparseable means 1.
    pub duration_days: Option<serde_json::Value>,
}

/// Response for a freshly issued key.
#[derive(Debug, Serialize)]
pub struct IssuedKeyResponse {
    pub id: i64,
    pub key: String,
    pub package: Option<String>,
    pub duration_days: i64,
    pub created_at: String,
    pub expires_at: Option<String>,
}

impl From<LicenseKey> for IssuedKeyResponse {
    fn from(k: LicenseKey) -> Self {
        Self {
            id: k.id,
            key: k.key_text,
            package: k.package,
            duration_days: k.duration_days,
            created_at: rfc3339(k.created_at),
            expires_at: k.expires_at.map(rfc3339),
        }
    }
}

/// A full key record as rendered by the list and download endpoints.
#[derive(Debug, Serialize)]
pub struct KeyRecord {
    pub id: i64,
    pub key_text: String,
    pub package: Option<String>,
    pub duration_days: i64,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub active: bool,
}

impl From<LicenseKey> for KeyRecord {
    fn from(k: LicenseKey) -> Self {
        Self {
            id: k.id,
            key_text: k.key_text,
            package: k.package,
            duration_days: k.duration_days,
            created_at: rfc3339(k.created_at),
            expires_at: k.expires_at.map(rfc3339),
            active: k.active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// Render a unix-seconds timestamp as RFC3339 for the HTTP boundary.
fn rfc3339(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
