//! GET <base>/jupyter-fs/make-revert?hash=
//!
//! Runs the revert script with `hash` as its only argument and returns
//! `{"res", "error"}`. A missing `hash` is a 400 and nothing is run.
//! When `hash` is repeated the last value wins; surrounding whitespace is
//! stripped.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::RevertResponse;
use crate::routes::{endpoint, script_response, SharedState};

pub fn routes(base_url: &str, state: SharedState) -> Router {
    Router::new()
        .route(&endpoint(base_url, "make-revert"), get(make_revert))
        .with_state(state)
}

/// Last value of `name` in the query, trimmed.
fn last_argument<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
}

async fn make_revert(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<(StatusCode, Json<RevertResponse>)> {
    let hash = last_argument(&params, "hash").ok_or(AppError::MissingArgument("hash"))?;
    let output = state.executor.revert(hash).await?;
    let body = RevertResponse::from(output.clone());
    Ok(script_response(&state, &output, body))
}
