//! HTTP route handlers for the almanac API.

use almanac::core::types::{OutputFormat, PipelineResult};
use almanac::pipeline::DATE_FORMAT;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/almanac", get(get_almanac))
        .route("/contexts/{user_id}", get(get_context))
        .route("/contexts/{user_id}/messages", post(post_message))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct AlmanacQuery {
    /// `YYYY-MM-DD`; defaults to today (server local time).
    date: Option<String>,
    /// Overrides the configured output format (`text` or `json`).
    format: Option<String>,
}

/// GET /api/almanac?date=YYYY-MM-DD - run the pipeline for one date.
///
/// The HTTP status mirrors the result's `status`.
async fn get_almanac(
    State(state): State<AppState>,
    Query(query): Query<AlmanacQuery>,
) -> (StatusCode, Json<PipelineResult>) {
    let format = match query.format.as_deref().map(str::parse::<OutputFormat>) {
        Some(Ok(format)) => Some(format),
        Some(Err(err)) => {
            warn!(error = %err, "rejected almanac request");
            return (
                StatusCode::BAD_REQUEST,
                Json(PipelineResult::failure(err.to_string())),
            );
        }
        None => None,
    };
    let date = query
        .date
        .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());
    info!(%date, format = ?format, "almanac requested");

    let pipeline = state.pipeline.clone();
    let fetcher = state.fetcher.clone();
    let result = tokio::task::spawn_blocking(move || match format {
        Some(format) if format != pipeline.format() => pipeline
            .as_ref()
            .clone()
            .with_format(format)
            .process(fetcher.as_ref(), &date),
        _ => pipeline.process(fetcher.as_ref(), &date),
    })
    .await
    .unwrap_or_else(|err| {
        warn!(error = %err, "pipeline task failed");
        PipelineResult::failure(format!("pipeline task failed: {err}"))
    });

    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(result))
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredResponse {
    stored: bool,
}

/// POST /api/contexts/:user_id/messages - buffer a chat message.
async fn post_message(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Json<StoredResponse> {
    let now = Utc::now();
    let stored = state.contexts(now).record(&user_id, &body.text, now);
    if stored {
        info!(%user_id, "stored message");
    }
    Json(StoredResponse { stored })
}

#[derive(Debug, Serialize, Deserialize)]
struct ContextResponse {
    user_id: String,
    history: String,
}

/// GET /api/contexts/:user_id - buffered messages formatted as history.
async fn get_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ContextResponse>, StatusCode> {
    let history = state
        .contexts(Utc::now())
        .history(&user_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ContextResponse { user_id, history }))
}
