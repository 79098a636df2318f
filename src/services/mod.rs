/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Server-Sent Events streaming for viewers.
pub mod sse_service;
/// Tick loop and controller command handling.
pub mod timer_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
