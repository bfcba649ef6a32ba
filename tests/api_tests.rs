//! HTTP tests: drive the router in-process with `oneshot`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use mboxview::api::{router, AppState};
use mboxview::config::PerformanceConfig;
use mboxview::model::mail::EmailRecord;
use mboxview::model::page::EmailPage;
use mboxview::search::IdMode;
use mboxview::store::archive::Archive;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn app_with(static_dir: &Path, id_mode: IdMode) -> Router {
    let archive = Archive::open(fixture("sample.mbox"), &PerformanceConfig::default()).unwrap();
    router(Arc::new(AppState {
        archive,
        static_dir: static_dir.to_path_buf(),
        id_mode,
        default_per_page: 20,
    }))
}

fn app() -> Router {
    app_with(&Path::new(env!("CARGO_MANIFEST_DIR")).join("web"), IdMode::Absolute)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, body.to_vec())
}

// ─── /emails ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_defaults() {
    let (status, content_type, body) = get(app(), "/emails").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let page: EmailPage = serde_json::from_slice(&body).unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 20);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_list_json_shape() {
    let (_, _, body) = get(app(), "/emails?per_page=1").await;
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    for key in ["emails", "total", "page", "per_page", "total_pages"] {
        assert!(keys.contains(&key), "missing key {key}");
    }
    let email = &value["emails"][0];
    for key in ["id", "subject", "from", "date", "body"] {
        assert!(email.get(key).is_some(), "missing email key {key}");
    }
}

#[tokio::test]
async fn test_list_with_filters() {
    let (status, _, body) = get(
        app(),
        "/emails?search=invoice&from_date=2024-01-01&to_date=2024-01-31&page=1&per_page=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page: EmailPage = serde_json::from_slice(&body).unwrap();
    let ids: Vec<u64> = page.emails.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test]
async fn test_list_empty_params_use_defaults() {
    let (status, _, body) = get(app(), "/emails?page=&per_page=&search=&sender=").await;
    assert_eq!(status, StatusCode::OK);
    let page: EmailPage = serde_json::from_slice(&body).unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.per_page, 20);
}

#[tokio::test]
async fn test_list_invalid_parameter_is_500() {
    for uri in [
        "/emails?page=abc",
        "/emails?per_page=0",
        "/emails?from_date=yesterday",
    ] {
        let (status, _, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["error"].as_str().is_some(), "{uri}");
    }
}

#[tokio::test]
async fn test_list_filtered_id_mode() {
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("web");
    let (_, _, body) = get(app_with(&static_dir, IdMode::Filtered), "/emails?search=invoice").await;
    let page: EmailPage = serde_json::from_slice(&body).unwrap();
    let ids: Vec<u64> = page.emails.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

// ─── /email ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_email() {
    let (status, _, body) = get(app(), "/email?id=1").await;
    assert_eq!(status, StatusCode::OK);
    let record: EmailRecord = serde_json::from_slice(&body).unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(record.subject, "Your invoice #1001");
    assert_eq!(record.date, "2024-01-15 12:00:00");
}

#[tokio::test]
async fn test_get_email_default_id() {
    let (status, _, body) = get(app(), "/email").await;
    assert_eq!(status, StatusCode::OK);
    let record: EmailRecord = serde_json::from_slice(&body).unwrap();
    assert_eq!(record.id, 0);
}

#[tokio::test]
async fn test_get_email_not_found() {
    for uri in ["/email?id=99", "/email?id=-1", "/email?id=8"] {
        let (status, _, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "Email not found" }));
    }
}

#[tokio::test]
async fn test_get_email_bad_id_is_500() {
    let (status, _, _) = get(app(), "/email?id=first").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ─── Static assets ──────────────────────────────────────────────────

#[tokio::test]
async fn test_index_page() {
    let (status, content_type, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert!(String::from_utf8(body).unwrap().contains("app.js"));
}

#[tokio::test]
async fn test_script_and_stylesheet() {
    let (status, content_type, _) = get(app(), "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/javascript"));

    let (status, content_type, _) = get(app(), "/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/css"));
}

#[tokio::test]
async fn test_unknown_paths_are_404_without_body() {
    for uri in ["/missing.js", "/index.html", "/emails/", "/nope", "/../Cargo.toml.css"] {
        let (status, _, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn test_missing_index_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, _) = get(app_with(dir.path(), IdMode::Absolute), "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "ok");
}
