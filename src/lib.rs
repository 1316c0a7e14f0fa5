//! Library crate for wordwheel-back, exposing modules for binaries and integration tests.

/// Runtime configuration.
pub mod config;
/// Wire and HTTP payloads.
pub mod dto;
/// HTTP error mapping.
pub mod error;
/// HTTP and WebSocket routes.
pub mod routes;
/// Connection drivers and route services.
pub mod services;
/// Catalog, sessions, and the turn engine.
pub mod state;
