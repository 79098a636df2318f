use axum::Router;

use crate::state::SharedState;

/// Controller command endpoint.
pub mod admin;
/// Swagger UI.
pub mod docs;
/// Liveness probe.
pub mod health;
/// Read-only timer state.
pub mod public;
/// Viewer event stream.
pub mod sse;
/// Viewer and controller socket.
pub mod websocket;

/// Compose all route trees and wire in the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(admin::router())
        .merge(public::router())
        .merge(docs::router());

    api_router.with_state(state)
}
