use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{errors::HttpError, state::HttpState};

pub async fn require_bearer(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);
    if !provided.is_some_and(|token| tokens_match(token, expected)) {
        warn!(path = %req.uri().path(), "rejected request with missing or invalid bearer token");
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            "missing or invalid bearer token",
            Some("unauthorized".to_string()),
        ));
    }

    Ok(next.run(req).await)
}

pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Compares without short-circuiting on the first differing byte.
pub(crate) fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
