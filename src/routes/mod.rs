//! API route handlers, all mounted under `<base_url>/jupyter-fs/`.
//!
//! - `example`: GET get-example, fixed payload
//! - `commit`: GET make-commit, runs the commit script
//! - `revert`: GET make-revert?hash=, runs the revert script
//!
//! Every route sits behind `auth::require_token`.

pub mod commit;
pub mod example;
pub mod revert;

use std::sync::Arc;

use axum::{http::StatusCode, middleware, Json, Router};
use serde::Serialize;

use crate::auth::{require_token, SharedAuth};
use crate::exec::{ProcessOutput, SharedExecutor};

pub const NAMESPACE: &str = "jupyter-fs";

#[derive(Clone)]
pub struct AppState {
    pub executor: SharedExecutor,
    /// Map unsuccessful script exits to 502 instead of 200.
    pub strict_exit: bool,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(base_url: &str, state: SharedState, auth: SharedAuth) -> Router {
    Router::new()
        .merge(example::routes(base_url))
        .merge(commit::routes(base_url, state.clone()))
        .merge(revert::routes(base_url, state))
        .route_layer(middleware::from_fn_with_state(auth, require_token))
}

/// Joins URL segments with exactly one slash between them, keeping the
/// leading slash of the first segment.
pub fn url_path_join(parts: &[&str]) -> String {
    let mut path = String::new();
    for part in parts {
        let part = part.trim_matches('/');
        if part.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(part);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

pub fn endpoint(base_url: &str, name: &str) -> String {
    url_path_join(&[base_url, NAMESPACE, name])
}

/// Status for a script-backed response. Exit codes only matter in strict mode.
pub fn script_response<T: Serialize>(
    state: &AppState,
    output: &ProcessOutput,
    body: T,
) -> (StatusCode, Json<T>) {
    let status = if state.strict_exit && !output.success() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, Json(body))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::{create_router, AppState};
    use crate::auth::Auth;
    use crate::exec::testing::RecordingRunner;
    use crate::exec::{ScriptExecutor, ScriptSet};

    pub const TOKEN: &str = "test-token";
    pub const WORK_DIR: &str = "/srv/notebooks";

    pub fn app_with(base_url: &str, runner: Arc<RecordingRunner>, strict_exit: bool) -> Router {
        let executor = ScriptExecutor::new(ScriptSet::default(), PathBuf::from(WORK_DIR), runner);
        let state = Arc::new(AppState {
            executor: Arc::new(executor),
            strict_exit,
        });
        create_router(base_url, state, Arc::new(Auth::Token(TOKEN.to_string())))
    }

    pub fn app(runner: Arc<RecordingRunner>) -> Router {
        app_with("/", runner, false)
    }

    pub const JSON: &str = "application/json";

    pub async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = Request::builder()
            .uri(uri)
            .header("Authorization", format!("token {}", TOKEN))
            .body(Body::empty())
            .unwrap();
        send(app, request).await
    }

    /// Returns status, `Content-Type` and body text.
    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};

    use super::test_support::*;
    use super::*;
    use crate::exec::testing::RecordingRunner;

    #[test]
    fn joins_paths_like_a_notebook_server() {
        assert_eq!(endpoint("/", "get-example"), "/jupyter-fs/get-example");
        assert_eq!(endpoint("/user/a/", "make-commit"), "/user/a/jupyter-fs/make-commit");
        assert_eq!(url_path_join(&["/", ""]), "/");
    }

    #[tokio::test]
    async fn honours_base_url() {
        let runner = Arc::new(RecordingRunner::ok("", ""));
        let app = app_with("/user/alice/", runner, false);

        let (status, _, _) = get(app.clone(), "/user/alice/jupyter-fs/get-example").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = get(app, "/jupyter-fs/get-example").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_requests_without_token() {
        let runner = Arc::new(RecordingRunner::ok("abc123", ""));
        let app = app(runner.clone());

        for uri in ["/jupyter-fs/get-example", "/jupyter-fs/make-commit", "/jupyter-fs/make-revert?hash=abc"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, content_type, body) = send(app.clone(), request).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(content_type.as_deref(), Some(JSON));
            assert_eq!(body, r#"{"error":"Forbidden"}"#);
        }
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn accepts_query_token() {
        let runner = Arc::new(RecordingRunner::ok("", ""));
        let request = Request::builder()
            .uri(format!("/jupyter-fs/get-example?token={}", TOKEN))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app(runner), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn only_get_is_routed() {
        let runner = Arc::new(RecordingRunner::ok("", ""));
        let request = Request::builder()
            .method("POST")
            .uri("/jupyter-fs/make-commit")
            .header("Authorization", format!("token {}", TOKEN))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app(runner.clone()), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(runner.calls().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_real_scripts_in_work_dir() {
        use std::path::PathBuf;

        use crate::auth::Auth;
        use crate::exec::{ScriptExecutor, ScriptSet, SystemRunner};

        let dir = tempfile::tempdir().unwrap();
        let script_dir = dir.path().join("jupyter_fs/script");
        std::fs::create_dir_all(&script_dir).unwrap();
        std::fs::write(script_dir.join("commit.sh"), "printf abc123\n").unwrap();
        std::fs::write(script_dir.join("revert.sh"), "printf \"reset to %s\" \"$1\"\necho oops >&2\nexit 1\n").unwrap();

        let scripts = ScriptSet::new("sh", &PathBuf::from("./jupyter_fs/script"), "commit.sh", "revert.sh");
        let executor = ScriptExecutor::new(scripts, dir.path().to_path_buf(), Arc::new(SystemRunner));
        let state = Arc::new(AppState {
            executor: Arc::new(executor),
            strict_exit: false,
        });
        let app = create_router("/", state, Arc::new(Auth::Token(TOKEN.to_string())));

        let (status, _, body) = get(app.clone(), "/jupyter-fs/make-commit").await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["hash"], "abc123");
        assert_eq!(body["error"], "");
        assert_eq!(body["curdir"], dir.path().to_string_lossy().to_string());

        let (status, _, body) = get(app, "/jupyter-fs/make-revert?hash=deadbeef").await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["res"], "reset to deadbeef");
        assert_eq!(body["error"], "oops\n");
    }
}
