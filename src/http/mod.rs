// src/http/mod.rs
//! The `/alexandria/*` HTTP JSON API.
//!
//! Every response body carries a `status` field of `ok`, `error`, or
//! `skipped`. Handler failures, including malformed request bodies, are
//! converted into `{status: "error", message}` payloads instead of
//! propagating to the transport, so a bad request can never take the host
//! down. Responses use HTTP 200 throughout, matching the original
//! extension's behavior.

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::cache::{DiffCache, DiffOutcome};
use crate::error::AlexandriaError;
use crate::storage::{StorageRoot, TemplateStore};
use crate::template::Template;

/// Shared handler state.
///
/// The storage root and diff cache are the only shared mutable values;
/// both sit behind their own lock. `write_lock` serializes file writes so
/// two saves to the same sanitized path cannot interleave.
#[derive(Clone)]
pub struct AppState {
    pub root: Arc<StorageRoot>,
    pub store: TemplateStore,
    pub cache: Arc<Mutex<DiffCache>>,
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: Arc<StorageRoot>) -> Self {
        Self {
            store: TemplateStore::new(root.clone()),
            root,
            cache: Arc::new(Mutex::new(DiffCache::new())),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/alexandria/storage-dir",
            get(get_storage_dir).post(set_storage_dir),
        )
        .route("/alexandria/templates", get(list_templates))
        .route("/alexandria/templates/save", post(save_template))
        .route("/alexandria/templates/delete", post(delete_template))
        .route("/alexandria/templates/sync", post(sync_templates))
        .route("/alexandria/save", post(diff_save))
        .with_state(state)
}

/// A handler failure, rendered as a structured `status: error` body.
pub struct ApiError {
    message: String,
}

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<AlexandriaError> for ApiError {
    fn from(err: AlexandriaError) -> Self {
        Self::new(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Json(ErrorResponse {
            status: "error",
            message: self.message,
        })
        .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Unwrap a JSON body extractor, turning rejections (bad syntax, wrong
/// content type) into structured errors.
fn require_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::new(format!("invalid request body: {rejection}"))),
    }
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

// ---------------------------------------------------------------------------
// GET/POST /alexandria/storage-dir
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StorageDirResponse {
    status: &'static str,
    storage_directory: String,
    exists: bool,
}

async fn get_storage_dir(State(state): State<AppState>) -> Json<StorageDirResponse> {
    let resolved = state.root.resolve();
    Json(StorageDirResponse {
        status: "ok",
        exists: resolved.is_dir(),
        storage_directory: resolved.display().to_string(),
    })
}

#[derive(Deserialize)]
struct SetStorageDirRequest {
    storage_directory: Option<String>,
}

async fn set_storage_dir(
    State(state): State<AppState>,
    payload: Result<Json<SetStorageDirRequest>, JsonRejection>,
) -> ApiResult<StorageDirResponse> {
    let body = require_body(payload)?;
    let dir = body
        .storage_directory
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::new("storage_directory is required"))?;

    state.root.set(dir);
    let resolved = state.root.resolve();
    fs::create_dir_all(&resolved).map_err(|e| {
        ApiError::new(format!("cannot create {}: {e}", resolved.display()))
    })?;

    tracing::info!(dir = %resolved.display(), "storage directory changed");
    Ok(Json(StorageDirResponse {
        status: "ok",
        exists: true,
        storage_directory: resolved.display().to_string(),
    }))
}

// ---------------------------------------------------------------------------
// GET /alexandria/templates
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TemplateListResponse {
    status: &'static str,
    templates: Vec<Template>,
    count: usize,
    skipped_files: usize,
    storage_directory: String,
}

async fn list_templates(State(state): State<AppState>) -> ApiResult<TemplateListResponse> {
    let outcome = state.store.load_all()?;
    Ok(Json(TemplateListResponse {
        status: "ok",
        count: outcome.templates.len(),
        skipped_files: outcome.skipped,
        templates: outcome.templates,
        storage_directory: state.root.resolve().display().to_string(),
    }))
}

// ---------------------------------------------------------------------------
// POST /alexandria/templates/save
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TemplateSaveResponse {
    status: &'static str,
    name: String,
    file_path: String,
}

async fn save_template(
    State(state): State<AppState>,
    payload: Result<Json<Template>, JsonRejection>,
) -> ApiResult<TemplateSaveResponse> {
    let mut template = require_body(payload)?;
    if template.name.trim().is_empty() {
        return Err(ApiError::new("name is required"));
    }

    template.stamp(&now_iso());

    let _guard = state.write_lock.lock().await;
    let path = state.store.save(&template)?;

    Ok(Json(TemplateSaveResponse {
        status: "ok",
        name: template.name,
        file_path: path.display().to_string(),
    }))
}

// ---------------------------------------------------------------------------
// POST /alexandria/templates/delete
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DeleteRequest {
    name: Option<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    status: &'static str,
    name: String,
}

async fn delete_template(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let body = require_body(payload)?;
        let name = body
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::new("name is required"))?;

        let _guard = state.write_lock.lock().await;
        let removed = state.store.delete(&name)?;
        if removed {
            // The diff cache must never stand in for on-disk existence: a
            // stale hash here would make an identical re-save skip the
            // write and the file would never be recreated.
            state.cache.lock().await.invalidate(&name);
        }
        Ok::<_, ApiError>((name, removed))
    }
    .await;

    match result {
        // Absent file is a soft error status, not a failure.
        Ok((name, false)) => ApiError::new(format!("Template not found: {name}")).into_response(),
        Ok((name, true)) => Json(DeleteResponse {
            status: "ok",
            name,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

// ---------------------------------------------------------------------------
// POST /alexandria/templates/sync
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SyncRequest {
    #[serde(default)]
    templates: Vec<Template>,
}

#[derive(Serialize)]
struct SyncResponse {
    status: &'static str,
    templates: Vec<Template>,
    count: usize,
    saved_count: usize,
}

/// Additive merge of browser-held templates into the store. Names already
/// on disk are never overwritten or deleted.
async fn sync_templates(
    State(state): State<AppState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResult<SyncResponse> {
    let body = require_body(payload)?;

    let _guard = state.write_lock.lock().await;

    let mut existing: HashSet<String> = state
        .store
        .load_all()?
        .templates
        .into_iter()
        .map(|t| t.name)
        .collect();

    let now = now_iso();
    let mut saved_count = 0;
    for mut template in body.templates {
        if template.name.trim().is_empty() || existing.contains(&template.name) {
            continue;
        }
        if template.updated_at.is_none() {
            template.stamp(&now);
        }
        state.store.save(&template)?;
        existing.insert(template.name);
        saved_count += 1;
    }

    let merged = state.store.load_all()?;
    Ok(Json(SyncResponse {
        status: "ok",
        count: merged.templates.len(),
        templates: merged.templates,
        saved_count,
    }))
}

// ---------------------------------------------------------------------------
// POST /alexandria/save
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DiffSaveRequest {
    template_name: Option<String>,
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Serialize)]
struct DiffSaveResponse {
    status: &'static str,
    template_name: String,
    hash: String,
    entry_count: usize,
}

#[derive(Serialize)]
struct SkippedResponse {
    status: &'static str,
    message: &'static str,
}

/// Save driven by a workflow node: run diff detection first and only
/// persist when the entries actually changed.
async fn diff_save(
    State(state): State<AppState>,
    payload: Result<Json<DiffSaveRequest>, JsonRejection>,
) -> Response {
    let body = match require_body(payload) {
        Ok(body) => body,
        Err(e) => return e.into_response(),
    };
    let name = body.template_name.unwrap_or_else(|| "Unnamed".to_string());

    if body.entries.is_empty() {
        return ApiError::new("No entries provided").into_response();
    }

    let content = Value::Array(body.entries.clone());
    let hash = {
        let mut cache = state.cache.lock().await;
        match cache.check_and_update(&name, &content) {
            DiffOutcome::Unchanged => {
                return Json(SkippedResponse {
                    status: "skipped",
                    message: "No changes detected",
                })
                .into_response();
            }
            DiffOutcome::Changed { hash } => hash,
        }
    };

    let mut template = Template::new(name.clone(), body.entries);
    template.hash = Some(hash.clone());
    template.stamp(&now_iso());

    let write_result = {
        let _guard = state.write_lock.lock().await;
        state.store.save(&template)
    };
    if let Err(e) = write_result {
        // The cache already accepted the new hash; forget it so the next
        // attempt is not skipped.
        state.cache.lock().await.invalidate(&name);
        return ApiError::from(e).into_response();
    }

    Json(DiffSaveResponse {
        status: "ok",
        template_name: name,
        hash,
        entry_count: template.entries.len(),
    })
    .into_response()
}
