use rusqlite::{params, Connection};

use crate::error::{AppError, Result};
use crate::models::{LicenseKey, NewKey};

use super::from_row::{query_all, query_one, KEY_COLS};

/// Insert a new key record and return it with the store-assigned id.
///
/// A UNIQUE violation on key_text surfaces as `AppError::DuplicateKey`
/// so the caller can regenerate and retry. Every other failure maps to
/// `AppError::Database`.
pub fn insert_key(conn: &Connection, new: &NewKey) -> Result<LicenseKey> {
    conn.execute(
        "INSERT INTO keys (key_text, package, duration_days, created_at, expires_at, active)
         VALUES (?1, ?2, ?3, ?4, ?5, 1)",
        params![
            &new.key_text,
            &new.package,
            new.duration_days,
            new.created_at,
            new.expires_at
        ],
    )
    .map_err(|e| match &e {
        // Only the key_text UNIQUE constraint is a retryable collision;
        // every other constraint failure is a storage fault.
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            AppError::DuplicateKey(new.key_text.clone())
        }
        _ => AppError::Database(e),
    })?;

    Ok(LicenseKey {
        id: conn.last_insert_rowid(),
        key_text: new.key_text.clone(),
        package: new.package.clone(),
        duration_days: new.duration_days,
        created_at: new.created_at,
        expires_at: new.expires_at,
        active: true,
    })
}

/// List every key, newest first (ties broken by descending id).
pub fn list_keys(conn: &Connection) -> Result<Vec<LicenseKey>> {
    query_all(
        conn,
        &format!("SELECT {} FROM keys ORDER BY created_at DESC, id DESC", KEY_COLS),
        &[],
    )
}

/// Exact-match lookup by key text. Absence is `Ok(None)`, not an error.
pub fn get_key_by_text(conn: &Connection, key_text: &str) -> Result<Option<LicenseKey>> {
    query_one(
        conn,
        &format!("SELECT {} FROM keys WHERE key_text = ?1", KEY_COLS),
        &[&key_text],
    )
}
