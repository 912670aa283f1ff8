use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use models::{Country, DropdownOption, Selection, Year};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    controller::{InteractionController, RenderState, SelectionUpdate},
    error::ApiError,
    sessions::AppState,
    Result,
};

pub type SharedState = Arc<AppState>;

/// Session as returned to the page: staged dropdown values plus what is rendered.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub staged: Selection,
    pub state: RenderState,
}

impl SessionView {
    fn new(session_id: Uuid, controller: &InteractionController) -> Self {
        Self {
            session_id,
            staged: controller.staged(),
            state: controller.render_state().clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub countries: Vec<DropdownOption>,
    pub years: Vec<Year>,
    pub defaults: Selection,
}

/// GET /api/options
/// Dropdown contents and the startup selection
pub async fn get_options(State(state): State<SharedState>) -> impl IntoResponse {
    let countries = Country::ALL
        .iter()
        .map(|c| DropdownOption {
            label: c.label().to_string(),
            value: c.as_str().to_string(),
        })
        .collect();

    Json(OptionsResponse {
        countries,
        years: Year::all().collect(),
        defaults: state.defaults,
    })
}

/// POST /api/sessions
/// Starts a session and renders the default selection
pub async fn create_session(State(state): State<SharedState>) -> impl IntoResponse {
    let controller = InteractionController::start(state.provider.as_ref(), state.defaults).await;
    let view_state = controller.render_state().clone();
    let staged = controller.staged();
    let session_id = state.sessions.insert(controller).await;
    let active = state.sessions.len().await;
    tracing::info!(%session_id, active, "session started");

    (
        StatusCode::CREATED,
        Json(SessionView {
            session_id,
            staged,
            state: view_state,
        }),
    )
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<SharedState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let controller = state.sessions.get(session_id).await?;
    let controller = controller.lock().await;
    let view = SessionView::new(session_id, &controller);

    let etag = format!("\"{}-{}\"", session_id, view.state.revision);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ETAG,
        HeaderValue::from_str(&etag).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Ok((StatusCode::OK, headers, Json(view)))
}

/// PUT /api/sessions/:id/selection
/// Stages a dropdown change. Nothing is fetched and the render is untouched.
pub async fn stage_selection(
    State(state): State<SharedState>,
    Path(session_id): Path<Uuid>,
    Json(update): Json<SelectionUpdate>,
) -> Result<impl IntoResponse> {
    let controller = state.sessions.get(session_id).await?;
    let mut controller = controller.lock().await;
    controller.stage(update);

    Ok(Json(SessionView::new(session_id, &controller)))
}

/// POST /api/sessions/:id/submit
/// Commits the staged selection and re-renders
///
/// If the client goes away mid-fetch the submit is dropped with it. The render
/// only changes once the fetch has returned, so the session keeps its previous
/// render and the staged selection can be submitted again.
pub async fn submit(
    State(state): State<SharedState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let controller = state.sessions.get(session_id).await?;
    let mut controller = controller.lock().await;
    controller.submit(state.provider.as_ref()).await?;

    Ok(Json(SessionView::new(session_id, &controller)))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.sessions.remove(session_id).await?;
    tracing::info!(%session_id, "session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "fx-dashboard-api"
    }))
}
