use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{dto::ws::ServerMessage, error::AppError, state::SharedState};

/// Longest session identifier accepted in a path.
const MAX_SESSION_ID_LEN: usize = 128;

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Current projection of the session", body = ServerMessage),
        (status = 400, description = "Malformed session identifier"),
        (status = 404, description = "Unknown session")
    )
)]
/// Return the `QUESTION` or `GAME_OVER` view of a session, refreshing its clock first.
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ServerMessage>, AppError> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
        return Err(AppError::BadRequest("invalid session id".into()));
    }

    let snapshot = state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session `{id}` not found")))?;

    Ok(Json(snapshot.into()))
}

/// Configure the session inspection routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sessions/{id}", get(get_session))
}
