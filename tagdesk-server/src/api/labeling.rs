//! Dataset labeling API
//!
//! Mounted under `/api/items`.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use tagdesk_common::db::models::{Dataset, Direction, LabelingView, Progress};
use tagdesk_common::db::{mutator, progress, registry, store, LABEL_ITEMS};
use tagdesk_common::workflow::labeling;

use super::{ImportResponse, OkResponse, Outcome};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Label options as a JSON array or a comma-separated string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LabelOptionsInput {
    List(Vec<String>),
    Csv(String),
}

impl LabelOptionsInput {
    pub fn into_options(self) -> Vec<String> {
        match self {
            LabelOptionsInput::List(options) => options,
            LabelOptionsInput::Csv(raw) => registry::parse_label_options(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDatasetRequest {
    pub name: String,
    pub label_options: LabelOptionsInput,
    /// Initial items, inserted in the same transaction as the dataset
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct CreateDatasetResponse {
    pub dataset_id: i64,
    pub inserted: u64,
}

#[derive(Debug, Deserialize)]
pub struct BulkImportRequest {
    pub dataset_id: i64,
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub item_id: i64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct LabelOptionsResponse {
    pub label_options: Vec<String>,
}

/// POST /api/items/datasets
pub async fn create_dataset(
    State(state): State<AppState>,
    payload: Result<Json<CreateDatasetRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateDatasetResponse>)> {
    let Json(req) = payload?;

    let (dataset_id, inserted) = registry::create_dataset_with_items(
        &state.db,
        &req.name,
        req.label_options.into_options(),
        &req.items,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDatasetResponse {
            dataset_id,
            inserted,
        }),
    ))
}

/// POST /api/items/upload
///
/// Multipart form: `file` (a JSON array of item objects), `datasetName`, and
/// `labelOptions` as a comma-separated string.
pub async fn upload_dataset(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<CreateDatasetResponse>)> {
    let mut multipart = multipart?;

    let mut name: Option<String> = None;
    let mut label_options: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let key = field.name().unwrap_or("").to_string();
        match key.as_str() {
            "datasetName" => name = Some(field.text().await?),
            "labelOptions" => label_options = Some(field.text().await?),
            "file" => file_bytes = Some(field.bytes().await?.to_vec()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| missing_field("datasetName"))?;
    let label_options = label_options.ok_or_else(|| missing_field("labelOptions"))?;
    let file_bytes = file_bytes.ok_or_else(|| missing_field("file"))?;

    let items = match serde_json::from_slice::<Value>(&file_bytes) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            return Err(ApiError::MalformedInput(
                "uploaded file must hold a JSON array of items".to_string(),
            ))
        }
        Err(e) => {
            return Err(ApiError::MalformedInput(format!(
                "uploaded file is not valid JSON: {}",
                e
            )))
        }
    };

    let (dataset_id, inserted) = registry::create_dataset_with_items(
        &state.db,
        &name,
        registry::parse_label_options(&label_options),
        &items,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDatasetResponse {
            dataset_id,
            inserted,
        }),
    ))
}

fn missing_field(name: &str) -> ApiError {
    ApiError::MalformedInput(format!("missing form field '{}'", name))
}

/// GET /api/items/datasets
pub async fn list_datasets(State(state): State<AppState>) -> ApiResult<Json<Vec<Dataset>>> {
    Ok(Json(registry::list_datasets(&state.db).await?))
}

/// GET /api/items/datasets/:dataset_id
pub async fn get_dataset(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Dataset>> {
    let Path(dataset_id) = path?;
    Ok(Json(registry::get_dataset(&state.db, dataset_id).await?))
}

/// GET /api/items/label-options/:dataset_id
pub async fn get_label_options(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<LabelOptionsResponse>> {
    let Path(dataset_id) = path?;
    let label_options = registry::label_options(&state.db, dataset_id).await?;
    Ok(Json(LabelOptionsResponse { label_options }))
}

/// POST /api/items/bulk-import
///
/// Appends items after the existing ones; all or nothing.
pub async fn bulk_import(
    State(state): State<AppState>,
    payload: Result<Json<BulkImportRequest>, JsonRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let Json(req) = payload?;
    let inserted = store::insert_items(&state.db, req.dataset_id, &req.items).await?;
    Ok(Json(ImportResponse { inserted }))
}

/// GET /api/items/next/:dataset_id
///
/// Always the first item of the dataset; 404 when the dataset is empty.
pub async fn next_item(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Outcome<LabelingView>>> {
    let Path(dataset_id) = path?;
    let view = labeling::next_for_labeling(&state.db, dataset_id).await?;
    Ok(Json(Outcome::Item(view)))
}

/// GET /api/items/item/:dataset_id/:item_id
pub async fn get_item(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<Outcome<LabelingView>>> {
    let Path((dataset_id, item_id)) = path?;
    let view = labeling::item_view(&state.db, dataset_id, item_id).await?;
    Ok(Json(Outcome::Item(view)))
}

/// GET /api/items/navigate/:dataset_id/:item_id/:direction
pub async fn navigate(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64, String)>, PathRejection>,
) -> ApiResult<Json<Outcome<LabelingView>>> {
    let Path((dataset_id, item_id, direction)) = path?;
    let direction: Direction = direction.parse()?;
    let step = labeling::navigate(&state.db, dataset_id, item_id, direction).await?;

    let outcome = Outcome::from(step);
    if matches!(outcome, Outcome::EndOfSequence { .. }) {
        debug!("Dataset {}: no item {} of {}", dataset_id, direction, item_id);
    }
    Ok(Json(outcome))
}

/// POST /api/items/label
pub async fn label_item(
    State(state): State<AppState>,
    payload: Result<Json<LabelRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(req) = payload?;
    mutator::apply_label(&state.db, req.item_id, &req.label).await?;
    Ok(Json(OkResponse::ok()))
}

/// GET /api/items/progress/:dataset_id
pub async fn get_progress(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Progress>> {
    let Path(dataset_id) = path?;
    Ok(Json(progress::progress(&state.db, &LABEL_ITEMS, dataset_id).await?))
}

/// GET /api/items/export/:dataset_id
pub async fn export_dataset(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Path(dataset_id) = path?;
    Ok(Json(store::export_items(&state.db, dataset_id).await?))
}

/// Build labeling routes (relative to `/api/items`)
pub fn labeling_routes() -> Router<AppState> {
    Router::new()
        .route("/datasets", get(list_datasets).post(create_dataset))
        .route("/datasets/:dataset_id", get(get_dataset))
        .route("/upload", post(upload_dataset))
        .route("/label-options/:dataset_id", get(get_label_options))
        .route("/bulk-import", post(bulk_import))
        .route("/next/:dataset_id", get(next_item))
        .route("/item/:dataset_id/:item_id", get(get_item))
        .route("/navigate/:dataset_id/:item_id/:direction", get(navigate))
        .route("/label", post(label_item))
        .route("/progress/:dataset_id", get(get_progress))
        .route("/export/:dataset_id", get(export_dataset))
}
