//! Static assets for the browser client: `/` serves `index.html`, and any
//! path ending in `.js` or `.css` is looked up relative to the static
//! directory. Everything else is a 404 with an empty body.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::handlers::AppState;

/// `GET /`
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    serve_file(&state.static_dir, "index.html").await
}

/// Fallback for every unmatched route.
pub async fn static_asset(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    let path = uri.path();
    if method == Method::GET && (path.ends_with(".js") || path.ends_with(".css")) {
        return serve_file(&state.static_dir, path.trim_start_matches('/')).await;
    }
    StatusCode::NOT_FOUND.into_response()
}

async fn serve_file(dir: &Path, name: &str) -> Response {
    let Some(relative) = safe_relative_path(name) else {
        debug!(name, "Rejected asset path");
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(dir.join(relative)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(name))], bytes).into_response(),
        Err(e) => {
            debug!(name, error = %e, "Asset not available");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Accept only plain relative paths (no `..`, no root, no drive prefix).
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let plain = !name.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
    plain.then(|| path.to_path_buf())
}

/// Content type by extension; anything that is not script or stylesheet is HTML.
pub fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".js") {
        "application/javascript"
    } else if name.ends_with(".css") {
        "text/css"
    } else {
        "text/html"
    }
}
