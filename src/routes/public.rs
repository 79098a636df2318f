use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::timer::TimerSnapshot, state::SharedState};

/// Public read-only endpoints that expose the current timer.
pub fn router() -> Router<SharedState> {
    Router::new().route("/public/state", get(get_state))
}

#[utoipa::path(
    get,
    path = "/public/state",
    tag = "public",
    responses((status = 200, description = "Current timer snapshot", body = TimerSnapshot))
)]
/// Return the timer exactly as the next broadcast would carry it.
pub async fn get_state(State(state): State<SharedState>) -> Json<TimerSnapshot> {
    Json(state.snapshot().await)
}
