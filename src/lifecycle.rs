//! Key lifecycle: token generation, expiry computation, and validity
//! classification.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use rusqlite::Connection;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{LicenseKey, NewKey};

/// Token length in characters, alphabet [A-Z0-9].
pub const TOKEN_LEN: usize = 16;

/// Entropy drawn from the OS CSPRNG per derivation round.
const ENTROPY_BYTES: usize = 12;

const SECONDS_PER_DAY: i64 = 86400;

/// Insert attempts before giving up on a colliding token.
const MAX_INSERT_ATTEMPTS: u32 = 5;

/// Generate a human-friendly 16-character key token.
///
/// Draws 12 bytes from the OS CSPRNG, base64-encodes them, strips
/// everything outside [A-Za-z0-9] and uppercases the rest. Filtering
/// can leave fewer than 16 characters, so rounds repeat until enough
/// have accumulated. No uniqueness check happens here; the store's
/// UNIQUE constraint is the arbiter and callers retry on collision.
pub fn generate_token() -> String {
    let mut token = String::with_capacity(TOKEN_LEN);
    while token.len() < TOKEN_LEN {
        let mut raw = [0u8; ENTROPY_BYTES];
        OsRng.fill_bytes(&mut raw);
        token.extend(
            BASE64
                .encode(raw)
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_uppercase()),
        );
    }
    token.truncate(TOKEN_LEN);
    token
}

/// Normalize a caller-supplied duration into whole days, minimum 1.
///
/// Accepts a JSON number or a numeric string; absence, parse failure,
/// or anything below 1 coerces to 1.
pub fn normalize_duration(raw: Option<&serde_json::Value>) -> i64 {
    let parsed = match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };
    match parsed {
        Some(days) if days >= 1 => days,
        _ => 1,
    }
}

/// Issue a new key: normalize the duration, stamp creation/expiry, and
/// insert with a freshly generated token.
///
/// Expiry is exact elapsed time (`duration * 86400` seconds), not
/// calendar days. A token collision on insert regenerates and retries
/// up to 5 times before failing with `ExhaustedRetries`.
pub fn issue_key(
    conn: &Connection,
    package: Option<String>,
    duration_raw: Option<&serde_json::Value>,
) -> Result<LicenseKey> {
    issue_key_with(conn, package, duration_raw, generate_token)
}

/// [`issue_key`] with a caller-supplied token source, so tests can
/// force collisions deterministically.
pub fn issue_key_with(
    conn: &Connection,
    package: Option<String>,
    duration_raw: Option<&serde_json::Value>,
    mut next_token: impl FnMut() -> String,
) -> Result<LicenseKey> {
    let duration_days = normalize_duration(duration_raw);
    let created_at = Utc::now().timestamp();
    // Saturating: absurd durations pin to the far future rather than wrap
    let expires_at = created_at.saturating_add(duration_days.saturating_mul(SECONDS_PER_DAY));

    for attempt in 1..=MAX_INSERT_ATTEMPTS {
        let new = NewKey {
            key_text: next_token(),
            package: package.clone(),
            duration_days,
            created_at,
            expires_at: Some(expires_at),
        };
        match queries::insert_key(conn, &new) {
            Err(AppError::DuplicateKey(key)) => {
                tracing::warn!("Token collision on attempt {}: {}", attempt, key);
            }
            other => return other,
        }
    }
    Err(AppError::ExhaustedRetries)
}

/// Outcome of verifying a key against the store's current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    NotFound,
    Inactive,
    Expired,
    Valid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }

    pub fn message(self) -> &'static str {
        match self {
            Validity::NotFound => "Key not found",
            Validity::Inactive => "Key inactive",
            Validity::Expired => "Key expired",
            Validity::Valid => "Key valid",
        }
    }
}

/// Classify a record's validity at `now` (unix seconds).
///
/// Checks apply in strict priority order: a missing record dominates
/// everything, and the administrative active flag dominates expiry
/// timing (a deactivated key reports Inactive even when also expired).
/// A record without expires_at never expires.
pub fn classify(record: Option<&LicenseKey>, now: i64) -> Validity {
    let Some(record) = record else {
        return Validity::NotFound;
    };
    if !record.active {
        return Validity::Inactive;
    }
    match record.expires_at {
        Some(exp) if exp < now => Validity::Expired,
        _ => Validity::Valid,
    }
}
