//! HTTP receiver for workflow host notifications.
//!
//! The workflow host posts its "transition completed", "prepare form" and
//! "before save" notifications here. Each request opens the site, runs the
//! category transition plugin synchronously and answers with the outcome.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cattrans_core::{
    Article, BatchResult, Form, FormAdjustment, FormContext, HostContext, MessageLog,
    PrepareFormEvent, TransitionEvent, WorkflowPlugin, PLUGIN_GROUP, PLUGIN_NAME,
};
use cattrans_fs::Site;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server state shared across handlers.
///
/// Handlers run the plugin on the blocking pool; every call reads and writes
/// site files synchronously.
struct AppState {
    site_path: PathBuf,
}

/// Build the hook router for the site at `site_path`.
pub fn router(site_path: &Path) -> Router {
    let state = Arc::new(AppState {
        site_path: site_path.to_path_buf(),
    });

    Router::new()
        .route("/health", get(health))
        .route("/hooks/transition", post(transition_completed))
        .route("/hooks/prepare-form", post(prepare_form))
        .route("/hooks/before-save", post(before_save))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the hook server.
///
/// # Errors
/// Returns error if binding fails or server encounters an error.
pub async fn serve(site_path: &Path, host: &str, port: u16) -> Result<()> {
    let app = router(site_path);

    let addr = format!("{host}:{port}");
    info!(address = %addr, site = %site_path.display(), "Starting hook server");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Request/Response types ---

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    plugin: String,
}

#[derive(Debug, Deserialize)]
struct PrepareFormRequest {
    /// Context tag; defaults to the form's own name.
    #[serde(default)]
    context: Option<String>,
    form: Form,
}

#[derive(Debug, Serialize)]
struct PrepareFormResponse {
    adjustment: FormAdjustment,
    form: Form,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Handlers ---

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        plugin: format!("{PLUGIN_GROUP}/{PLUGIN_NAME}"),
    })
}

/// Batch-level problems are part of the result, not an HTTP error: the host
/// has already committed the transition.
async fn transition_completed(
    State(state): State<Arc<AppState>>,
    Json(event): Json<TransitionEvent>,
) -> Result<Json<BatchResult>, AppError> {
    let result = task::spawn_blocking(move || -> Result<BatchResult> {
        let mut site = Site::open(&state.site_path)?;
        let plugin = site.plugin();

        let mut messages = MessageLog::new();
        Ok(plugin.on_transition_completed(&event, &mut HostContext::new(&mut site, &mut messages)))
    })
    .await??;

    Ok(Json(result))
}

async fn prepare_form(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrepareFormRequest>,
) -> Result<Json<PrepareFormResponse>, AppError> {
    let response = task::spawn_blocking(move || -> Result<PrepareFormResponse> {
        let site = Site::open(&state.site_path)?;
        let mut form = req.form;

        let event = match req.context {
            Some(tag) => PrepareFormEvent {
                context: FormContext::from_tag(&tag),
                form: &mut form,
            },
            None => PrepareFormEvent::for_form(&mut form),
        };
        let adjustment = site.plugin().on_prepare_form(event)?;

        Ok(PrepareFormResponse { adjustment, form })
    })
    .await??;

    Ok(Json(response))
}

async fn before_save(
    State(state): State<Arc<AppState>>,
    Json(article): Json<Article>,
) -> Result<StatusCode, AppError> {
    task::spawn_blocking(move || -> Result<()> {
        let site = Site::open(&state.site_path)?;
        site.plugin().on_before_save(&article);
        Ok(())
    })
    .await??;

    Ok(StatusCode::NO_CONTENT)
}

// --- Error handling ---

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn site_with_articles() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let site = Site::init(tmp.path()).unwrap();
        site.create_article("Alpha", 3, 1).unwrap();
        site.create_article("Beta", 5, 1).unwrap();
        (tmp, site)
    }

    #[tokio::test]
    async fn test_transition_hook_moves_articles() {
        let (tmp, site) = site_with_articles();

        let (status, body) = post_json(
            router(tmp.path()),
            "/hooks/transition",
            &json!({
                "extension": "com_content.article",
                "pks": [1, 2],
                "transition": { "id": 1, "title": "Move", "options": { "category_id": "5" } }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processed"], json!(1));
        assert_eq!(body["skipped"], json!(1));
        assert_eq!(site.get_article(1).unwrap().category_id, 5);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_not_an_http_error() {
        let (tmp, site) = site_with_articles();

        let (status, body) = post_json(
            router(tmp.path()),
            "/hooks/transition",
            &json!({ "extension": "com_content.article", "pks": [1], "transition": "oops" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processed"], json!(0));
        assert_eq!(body["messages"][0]["severity"], json!("error"));
        assert_eq!(body["messages"][0]["text"], json!("Invalid transition object type"));
        assert_eq!(site.get_article(1).unwrap().category_id, 3);
    }

    #[tokio::test]
    async fn test_prepare_form_locks_category() {
        let (tmp, _site) = site_with_articles();
        let form = Form::article(None).with_value("catid", 7);

        let (status, body) = post_json(
            router(tmp.path()),
            "/hooks/prepare-form",
            &json!({ "context": "article-edit", "form": form }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["adjustment"]["kind"], json!("category_locked"));
        assert_eq!(body["form"]["data"]["catid"], json!(7));

        let catid = body["form"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "catid")
            .unwrap();
        assert_eq!(catid["attributes"]["readonly"], json!("true"));
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = TempDir::new().unwrap();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = router(tmp.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["plugin"], json!("workflow/category_transition"));
    }

    #[tokio::test]
    async fn test_missing_site_is_server_error() {
        let tmp = TempDir::new().unwrap();

        let (status, body) = post_json(
            router(tmp.path()),
            "/hooks/before-save",
            &serde_json::to_value(Article::new(1, "One", 2)).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("site not found"));

        let (status, body) = post_json(
            router(tmp.path()),
            "/hooks/transition",
            &json!({
                "extension": "com_content.article",
                "pks": [1],
                "transition": { "id": 1, "title": "Move", "options": { "category_id": 5 } }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("site not found"));
    }

    #[tokio::test]
    async fn test_broken_config_is_server_error() {
        let (tmp, _site) = site_with_articles();
        std::fs::write(tmp.path().join(".cattrans/config.yml"), "plugin: [not, found]\n").unwrap();

        let (status, body) = post_json(
            router(tmp.path()),
            "/hooks/before-save",
            &serde_json::to_value(Article::new(1, "One", 2)).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("yaml error"));
    }

    #[tokio::test]
    async fn test_before_save_accepts_article() {
        let (tmp, site) = site_with_articles();

        let (status, _) = post_json(
            router(tmp.path()),
            "/hooks/before-save",
            &serde_json::to_value(site.get_article(1).unwrap()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
