use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    http::{HeaderMap, header::COOKIE},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{services::websocket_service, state::SharedState};

/// Cookie carrying the player's session identifier.
const SESSION_COOKIE: &str = "session_id";

#[utoipa::path(
    get,
    path = "/ws",
    tag = "players",
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Upgrade the HTTP connection into a player WebSocket session.
pub async fn ws_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let session_id =
        session_id_from_cookies(&headers).unwrap_or_else(|| Uuid::new_v4().to_string());
    ws.on_upgrade(move |socket| websocket_service::handle_socket(state, socket, session_id))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}

fn session_id_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session_id=abc-123; lang=es"),
        );
        assert_eq!(session_id_from_cookies(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_cookies(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("session_id="));
        assert_eq!(session_id_from_cookies(&headers), None);
    }
}
