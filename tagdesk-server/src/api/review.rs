//! LLM output review API
//!
//! Mounted under `/api/llm-review`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use tagdesk_common::db::models::{Direction, LlmSession, Progress, ReviewInput, ReviewView};
use tagdesk_common::db::{mutator, progress, registry, store, REVIEW_INPUTS};
use tagdesk_common::workflow::review;

use super::{ImportResponse, OkResponse, Outcome};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: i64,
}

/// Inputs are kept as raw JSON so a bad entry is reported by index
#[derive(Debug, Deserialize)]
pub struct AddInputsRequest {
    pub session_id: i64,
    pub inputs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CurateRequest {
    pub input_id: i64,
    pub curated_output: String,
}

/// POST /api/llm-review/session
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let Json(req) = payload?;
    let session_id = registry::create_session(&state.db, &req.name, &req.description).await?;
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

/// GET /api/llm-review/sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<LlmSession>>> {
    Ok(Json(registry::list_sessions(&state.db).await?))
}

/// GET /api/llm-review/sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<LlmSession>> {
    let Path(session_id) = path?;
    Ok(Json(registry::get_session(&state.db, session_id).await?))
}

/// POST /api/llm-review/inputs
pub async fn add_inputs(
    State(state): State<AppState>,
    payload: Result<Json<AddInputsRequest>, JsonRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let Json(req) = payload?;
    let pairs = store::parse_review_pairs(&req.inputs)?;
    let inserted = store::insert_inputs(&state.db, req.session_id, &pairs).await?;
    Ok(Json(ImportResponse { inserted }))
}

/// GET /api/llm-review/next/:session_id
///
/// First pending input, else first reviewed one, else `no_more_items`.
pub async fn next_input(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Outcome<ReviewView>>> {
    let Path(session_id) = path?;
    let pick = review::next_for_review(&state.db, session_id).await?;
    Ok(Json(Outcome::from(pick)))
}

/// GET /api/llm-review/input/:session_id/:input_id
pub async fn get_input(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<Outcome<ReviewView>>> {
    let Path((session_id, input_id)) = path?;
    let view = review::input_view(&state.db, session_id, input_id).await?;
    Ok(Json(Outcome::Item(view)))
}

/// GET /api/llm-review/navigate/:session_id/:input_id/:direction
pub async fn navigate(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64, String)>, PathRejection>,
) -> ApiResult<Json<Outcome<ReviewView>>> {
    let Path((session_id, input_id, direction)) = path?;
    let direction: Direction = direction.parse()?;
    let step = review::navigate(&state.db, session_id, input_id, direction).await?;

    let outcome = Outcome::from(step);
    if matches!(outcome, Outcome::EndOfSequence { .. }) {
        debug!("Session {}: no input {} of {}", session_id, direction, input_id);
    }
    Ok(Json(outcome))
}

/// POST /api/llm-review/curate
pub async fn curate(
    State(state): State<AppState>,
    payload: Result<Json<CurateRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(req) = payload?;
    mutator::apply_curation(&state.db, req.input_id, &req.curated_output).await?;
    Ok(Json(OkResponse::ok()))
}

/// GET /api/llm-review/progress/:session_id
pub async fn get_progress(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Progress>> {
    let Path(session_id) = path?;
    Ok(Json(progress::progress(&state.db, &REVIEW_INPUTS, session_id).await?))
}

/// GET /api/llm-review/export/:session_id
pub async fn export_session(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<ReviewInput>>> {
    let Path(session_id) = path?;
    Ok(Json(store::export_inputs(&state.db, session_id).await?))
}

/// Build review routes (relative to `/api/llm-review`)
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:session_id", get(get_session))
        .route("/inputs", post(add_inputs))
        .route("/next/:session_id", get(next_input))
        .route("/input/:session_id/:input_id", get(get_input))
        .route("/navigate/:session_id/:input_id/:direction", get(navigate))
        .route("/curate", post(curate))
        .route("/progress/:session_id", get(get_progress))
        .route("/export/:session_id", get(export_session))
}
