use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/viewer",
    tag = "viewers",
    responses((status = 200, description = "Viewer SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream timer snapshots and effect notices to a display.
pub async fn viewer_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (receiver, initial) = sse_service::subscribe_viewer(&state).await;
    info!("New viewer SSE connection");
    sse_service::to_sse_stream(receiver, initial)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/viewer", get(viewer_stream))
}
