use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/subjects", post(handlers::add_subject))
        .route("/api/subjects/clear", post(handlers::clear_subjects))
        .route(
            "/api/subjects/:id",
            put(handlers::rename_subject).delete(handlers::remove_subject),
        )
        .route("/api/mode", put(handlers::switch_mode))
        .route("/api/config", put(handlers::update_config))
        .with_state(state)
}
