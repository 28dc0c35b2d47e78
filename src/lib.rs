//! Keysmith - a small self-hosted license key service
//!
//! This library provides the core functionality for the Keysmith service:
//! key generation and lifecycle logic, the SQLite-backed key store, and
//! the HTTP API handlers.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
