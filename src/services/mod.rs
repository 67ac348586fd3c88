/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Scoreboard commands mirrored to the key-value store.
pub mod scoreboard_service;
