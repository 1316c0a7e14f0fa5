use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Wordwheel Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::catalog::list_languages,
        crate::routes::session::get_session,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::catalog::LanguagesResponse,
            crate::dto::ws::InitPayload,
            crate::dto::ws::AnswerPayload,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::TimerSyncPayload,
            crate::dto::ws::ErrorPayload,
            crate::state::engine::Feedback,
            crate::state::session::ActiveView,
            crate::state::session::GameOverView,
            crate::state::session::LetterStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Question catalog metadata"),
        (name = "players", description = "WebSocket game sessions for players"),
    )
)]
pub struct ApiDoc;
