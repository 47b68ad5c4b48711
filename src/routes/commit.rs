//! GET <base>/jupyter-fs/make-commit
//!
//! Runs the commit script in the working directory and returns
//! `{"curdir", "hash", "error"}`, where `hash` is the script's stdout and
//! `error` its stderr.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::error::Result;
use crate::models::CommitResponse;
use crate::routes::{endpoint, script_response, SharedState};

pub fn routes(base_url: &str, state: SharedState) -> Router {
    Router::new()
        .route(&endpoint(base_url, "make-commit"), get(make_commit))
        .with_state(state)
}

async fn make_commit(State(state): State<SharedState>) -> Result<(StatusCode, Json<CommitResponse>)> {
    let output = state.executor.commit().await?;
    let body = CommitResponse::new(state.executor.work_dir_display(), output.clone());
    Ok(script_response(&state, &output, body))
}
