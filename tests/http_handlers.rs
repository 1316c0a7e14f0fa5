use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
};
use wordwheel_back::{
    config::AppConfig,
    dto::ws::ServerMessage,
    error::AppError,
    routes::{catalog::list_languages, health::healthcheck, session::get_session},
    state::{AppState, Catalog, SharedState},
};

fn app_state() -> SharedState {
    let catalog = Catalog::from_json_str(
        r#"{
            "en": [{"letter": "A", "question": "Q1", "answer": "ans1"}],
            "fr": [{"letter": "A", "question": "F1", "answer": "rep1"}]
        }"#,
    )
    .unwrap();
    let config = AppConfig::default().with_timing(Duration::from_secs(300), Duration::from_secs(1));
    AppState::new(catalog, config)
}

#[tokio::test]
async fn languages_lists_catalog_keys_and_default() {
    let Json(body) = list_languages(State(app_state())).await;
    assert_eq!(body.default, "en");
    assert_eq!(body.languages, vec!["en".to_string(), "fr".to_string()]);
}

#[tokio::test]
async fn healthcheck_counts_sessions() {
    let state = app_state();
    state.sessions().get_or_create("p1", "fr").await;

    let Json(body) = healthcheck(State(state)).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.active_sessions, 1);
}

#[tokio::test]
async fn session_view_is_served_or_not_found() {
    let state = app_state();

    let missing = get_session(State(state.clone()), Path("nobody".into())).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let too_long = get_session(State(state.clone()), Path("x".repeat(200))).await;
    assert!(matches!(too_long, Err(AppError::BadRequest(_))));

    state.sessions().get_or_create("p1", "fr").await;
    let Ok(Json(view)) = get_session(State(state), Path("p1".into())).await else {
        panic!("expected a session view");
    };
    match view {
        ServerMessage::Question(active) => {
            assert_eq!(active.prompt, "F1");
            assert_eq!(active.time_remaining, 300);
        }
        other => panic!("expected question view, got {other:?}"),
    }
}
