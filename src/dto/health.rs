use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always "ok" while the process serves requests.
    pub status: String,
    /// Number of connected viewers, WebSocket and SSE combined.
    pub viewers: usize,
    /// Whether a countdown is running.
    pub running: bool,
    /// Server wall-clock time (RFC 3339).
    pub server_time: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(viewers: usize, running: bool, server_time: String) -> Self {
        Self {
            status: "ok".to_string(),
            viewers,
            running,
            server_time,
        }
    }
}
