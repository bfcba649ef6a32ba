//! API request handlers

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::MboxError;
use crate::model::mail::EmailRecord;
use crate::model::page::EmailPage;
use crate::search::query::{lookup_id, ListQuery, QueryParams};
use crate::search::{self, IdMode};
use crate::store::archive::Archive;

/// Shared application state
pub struct AppState {
    pub archive: Archive,
    pub static_dir: PathBuf,
    pub id_mode: IdMode,
    pub default_per_page: i64,
}

/// JSON error envelope: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Request-scoped failure, converted to a JSON error response.
#[derive(Debug)]
pub enum ApiError {
    /// Expected miss (404).
    NotFound(String),
    /// Anything else (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => {
                debug!(%message, "Not found");
                (StatusCode::NOT_FOUND, message)
            }
            ApiError::Internal(message) => {
                error!(%message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<MboxError> for ApiError {
    fn from(e: MboxError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("query task failed: {e}"))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::Internal(e.body_text())
    }
}

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// `GET /emails`: filtered, paginated listing
pub async fn list_emails(
    State(state): State<Arc<AppState>>,
    pairs: QueryPairs,
) -> Result<Json<EmailPage>, ApiError> {
    let Query(pairs) = pairs?;
    let query = ListQuery::from_params(&QueryParams::new(pairs), state.default_per_page)?;

    let archive = state.archive.clone();
    let id_mode = state.id_mode;
    let page =
        tokio::task::spawn_blocking(move || search::list_emails(&archive, &query, id_mode))
            .await??;

    Ok(Json(page))
}

/// `GET /email?id=N`: single message by absolute archive position
pub async fn get_email(
    State(state): State<Arc<AppState>>,
    pairs: QueryPairs,
) -> Result<Json<EmailRecord>, ApiError> {
    let Query(pairs) = pairs?;
    let id = lookup_id(&QueryParams::new(pairs))?;

    let archive = state.archive.clone();
    let record = tokio::task::spawn_blocking(move || search::find_email(&archive, id)).await??;

    record
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Email not found".to_string()))
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
