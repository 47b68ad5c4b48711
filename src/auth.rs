//! Token authentication for the `/jupyter-fs` routes.
//!
//! Accepts the token the way a notebook server does:
//! - `Authorization: token <t>` or `Authorization: Bearer <t>`
//! - `?token=<t>` in the query string
//!
//! Installed as a route layer, so unknown paths still 404 without a token.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Disabled,
}

pub type SharedAuth = Arc<Auth>;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}

fn query_token(req: &Request) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(req.uri()).ok()?.0.token
}

impl Auth {
    pub fn allows(&self, req: &Request) -> bool {
        match self {
            Auth::Disabled => true,
            Auth::Token(expected) => {
                let presented = header_token(req.headers()).or_else(|| query_token(req));
                presented.as_deref() == Some(expected.as_str())
            }
        }
    }
}

pub async fn require_token(State(auth): State<SharedAuth>, req: Request, next: Next) -> Result<Response> {
    if !auth.allows(&req) {
        tracing::warn!(path = %req.uri().path(), "rejected unauthenticated request");
        return Err(AppError::Forbidden);
    }
    Ok(next.run(req).await)
}
