use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::catalog::LanguagesResponse, state::SharedState};

#[utoipa::path(
    get,
    path = "/languages",
    tag = "catalog",
    responses((status = 200, description = "Available question languages", body = LanguagesResponse))
)]
/// List the languages a player can pick.
pub async fn list_languages(State(state): State<SharedState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse::from(state.sessions().catalog()))
}

/// Configure the catalog routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/languages", get(list_languages))
}
