use crate::errors::AppError;
use crate::models::{
    AddSubjectRequest, ClearRequest, ConfigRequest, ModeRequest, RawValue, RenameSubjectRequest,
    SessionView, SubjectId,
};
use crate::session::{Session, SessionError};
use crate::state::AppState;
use crate::storage::persist_session;
use crate::ui::render_index;
use crate::views::build_view;
use axum::{
    Json,
    extract::{Path, State},
    response::Html,
};
use tracing::{debug, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_index(&session))
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(build_view(&session, None))
}

pub async fn add_subject(
    State(state): State<AppState>,
    Json(payload): Json<AddSubjectRequest>,
) -> Result<Json<SessionView>, AppError> {
    let lectures = payload
        .lectures_per_week
        .as_ref()
        .map(RawValue::to_raw_string)
        .unwrap_or_default();
    let view = apply(&state, Some("Subject added!"), |session| {
        session.add_subject(&payload.name, &lectures)
    })
    .await?;
    info!("added subject '{}'", payload.name.trim());
    Ok(Json(view))
}

pub async fn rename_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
    Json(payload): Json<RenameSubjectRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = apply(&state, Some("Subject updated!"), |session| {
        session.rename_subject(id, &payload.name)
    })
    .await?;
    info!("renamed subject {id}");
    Ok(Json(view))
}

pub async fn remove_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
) -> Result<Json<SessionView>, AppError> {
    let view = apply(&state, Some("Subject removed."), |session| session.remove_subject(id)).await?;
    info!("removed subject {id}");
    Ok(Json(view))
}

pub async fn clear_subjects(
    State(state): State<AppState>,
    Json(payload): Json<ClearRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = apply(&state, Some("All subjects cleared."), |session| {
        session.clear_subjects(payload.confirm)
    })
    .await?;
    info!("cleared all subjects");
    Ok(Json(view))
}

pub async fn switch_mode(
    State(state): State<AppState>,
    Json(payload): Json<ModeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = apply(&state, None, |session| Ok(session.switch_mode(payload.mode))).await?;
    debug!("duration mode is now {}", payload.mode);
    Ok(Json(view))
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<ConfigRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = apply(&state, None, |session| {
        let mut next = session.clone();
        if let Some(raw) = &payload.attendance_criterion {
            next = next.set_attendance_criterion(&raw.to_raw_string());
        }
        if let Some(raw) = &payload.working_days {
            next = next.set_working_days(&raw.to_raw_string());
        }
        if let Some(raw) = &payload.duration {
            next = next.set_duration(&raw.to_raw_string())?;
        }
        Ok(next)
    })
    .await?;
    debug!(valid = view.valid, "configuration updated");
    Ok(Json(view))
}

/// Runs one transition under the session lock: the new session is written
/// to disk before it replaces the current one.
async fn apply<F>(state: &AppState, notice: Option<&str>, transition: F) -> Result<SessionView, AppError>
where
    F: FnOnce(&Session) -> Result<Session, SessionError>,
{
    let mut session = state.session.lock().await;
    let next = transition(&*session)?;
    persist_session(&state.data_path, &next.to_data()).await?;
    *session = next;
    Ok(build_view(&session, notice))
}
