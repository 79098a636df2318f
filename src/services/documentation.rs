use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Saw Timer server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::viewer_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::admin::post_command,
        crate::routes::public::get_state,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::command::ControllerMessage,
            crate::dto::command::CommandAck,
            crate::dto::timer::TimerSnapshot,
            crate::dto::ws::ViewerOutboundMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "viewers", description = "Snapshot and effect streams for displays"),
        (name = "admin", description = "Controller commands"),
        (name = "public", description = "Read-only timer state"),
    )
)]
pub struct ApiDoc;
