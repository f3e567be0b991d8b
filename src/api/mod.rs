// HTTP API routes (uploads, listings, player scores).

use std::sync::Arc;

use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::{MediaKind, Store, StoreError};
use crate::retry::{self, RetryPolicy};

// ── Request types ─────────────────────────────────────────────────────

/// Structured score submission. Typed extraction rejects malformed bodies
/// (wrong types, missing fields) before the handler runs.
#[derive(Deserialize)]
pub struct PlayerScoreRequest {
    pub player_name: String,
    pub score: i64,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Cap on list responses, `None` for unbounded.
    pub list_limit: Option<i64>,
    /// Retry policy for list reads.
    pub retry: RetryPolicy,
}

// ── Error helpers ─────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": msg })))
}

/// Write failures are not retried and surface as a server error.
fn write_error(e: StoreError) -> impl IntoResponse {
    tracing::error!("document store write failed: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Read failures, after retries, surface as service-unavailable. Callers
/// never receive a partial list.
fn read_error(e: StoreError) -> impl IntoResponse {
    tracing::error!("document store read failed: {e}");
    json_error(StatusCode::SERVICE_UNAVAILABLE, "Document store unavailable")
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(health_check))
        // Media
        .route("/upload_sprite", post(upload_sprite))
        .route("/sprites", get(list_sprites))
        .route("/upload_audio", post(upload_audio))
        .route("/audio", get(list_audio))
        // Scores
        .route("/player_score", post(add_score))
        .route("/player_scores", get(list_scores))
        .layer(middleware)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "media-vault" }))
}

// ── Upload handlers ───────────────────────────────────────────────────

struct UploadedFile {
    filename: String,
    content: Vec<u8>,
}

/// Pull the `file` field out of a multipart body. `Ok(None)` means no such
/// field was present; `Err` carries a message for the client.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("invalid multipart body: {e}"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err("uploaded file must have a filename".to_string()),
        };
        let content = field
            .bytes()
            .await
            .map_err(|e| format!("failed to read uploaded file: {e}"))?
            .to_vec();
        return Ok(Some(UploadedFile { filename, content }));
    }
    Ok(None)
}

fn uploaded_message(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Sprite => "Sprite uploaded",
        MediaKind::Audio => "Audio file uploaded",
    }
}

async fn upload_media(state: AppState, mut multipart: Multipart, kind: MediaKind) -> Response {
    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return json_error(StatusCode::BAD_REQUEST, "multipart field 'file' is required")
                .into_response()
        }
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, &msg).into_response(),
    };

    match state.store.insert_media(kind, &file.filename, file.content).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "message": uploaded_message(kind), "id": id })),
        )
            .into_response(),
        Err(e) => write_error(e).into_response(),
    }
}

async fn upload_sprite(State(state): State<AppState>, multipart: Multipart) -> Response {
    upload_media(state, multipart, MediaKind::Sprite).await
}

async fn upload_audio(State(state): State<AppState>, multipart: Multipart) -> Response {
    upload_media(state, multipart, MediaKind::Audio).await
}

// ── List handlers ─────────────────────────────────────────────────────

async fn list_media(state: AppState, kind: MediaKind) -> Response {
    let store = state.store.clone();
    let limit = state.list_limit;
    let result = retry::with_retry(state.retry, || {
        let store = store.clone();
        async move { store.list_media(kind, limit).await }
    })
    .await;

    match result {
        Ok(items) => (StatusCode::OK, Json(json!(items))).into_response(),
        Err(e) => read_error(e).into_response(),
    }
}

async fn list_sprites(State(state): State<AppState>) -> Response {
    list_media(state, MediaKind::Sprite).await
}

async fn list_audio(State(state): State<AppState>) -> Response {
    list_media(state, MediaKind::Audio).await
}

async fn list_scores(State(state): State<AppState>) -> Response {
    let store = state.store.clone();
    let limit = state.list_limit;
    let result = retry::with_retry(state.retry, || {
        let store = store.clone();
        async move { store.list_scores(limit).await }
    })
    .await;

    match result {
        Ok(scores) => (StatusCode::OK, Json(json!(scores))).into_response(),
        Err(e) => read_error(e).into_response(),
    }
}

// ── Score handler ─────────────────────────────────────────────────────

async fn add_score(
    State(state): State<AppState>,
    Json(req): Json<PlayerScoreRequest>,
) -> Response {
    if req.player_name.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "player_name is required").into_response();
    }
    match state.store.insert_score(&req.player_name, req.score).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Score recorded", "id": id })),
        )
            .into_response(),
        Err(e) => write_error(e).into_response(),
    }
}
