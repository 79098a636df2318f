use crate::{
    dto::{format_epoch_ms, health::HealthResponse},
    state::SharedState,
};

/// Report liveness together with a few cheap gauges.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(
        state.viewer_count(),
        state.is_running().await,
        format_epoch_ms(state.now_ms()),
    )
}
