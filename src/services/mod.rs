/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Per-connection timer updates.
pub mod ticker_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
