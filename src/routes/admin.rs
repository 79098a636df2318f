use axum::{Json, Router, extract::State, routing::post};
use tracing::warn;

use crate::{
    dto::command::{CommandAck, ControllerMessage},
    error::AppError,
    services::timer_service,
    state::SharedState,
};

/// Controller endpoint mirroring the WebSocket command channel.
pub fn router() -> Router<SharedState> {
    Router::new().route("/admin/command", post(post_command))
}

/// Apply a controller command; the acknowledgement is returned to the caller only.
#[utoipa::path(
    post,
    path = "/admin/command",
    tag = "admin",
    request_body = ControllerMessage,
    responses(
        (status = 200, description = "Command applied", body = CommandAck),
        (status = 400, description = "Invalid arguments or unknown command", body = CommandAck),
        (status = 401, description = "Missing or wrong admin key", body = CommandAck)
    )
)]
pub async fn post_command(
    State(state): State<SharedState>,
    body: String,
) -> Result<Json<CommandAck>, AppError> {
    // An unreadable envelope carries no credential and is rejected as such.
    let payload = ControllerMessage::from_json_str(&body).unwrap_or_else(|err| {
        warn!(error = %err, "unparsable controller request body");
        ControllerMessage::default()
    });
    let outcome = timer_service::execute_command(&state, &payload).await?;
    Ok(Json(outcome.ack()))
}
