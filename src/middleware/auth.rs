// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the raw token out of `Authorization: Bearer <token>`.
///
/// The token itself is not inspected here; a header without the exact
/// `Bearer ` prefix is rejected before any decoding is attempted.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::AuthHeaderMissing)?
        .to_str()
        .map_err(|_| AppError::AuthHeaderMalformed)?;

    value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AppError::AuthHeaderMalformed)
}

/// Middleware that requires a valid client bearer token.
///
/// On success the verified [`ClientIdentity`](crate::services::ClientIdentity)
/// is available to handlers as a request extension.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = {
        let token = bearer_token(request.headers()).inspect_err(|err| {
            tracing::warn!(reason = err.code(), path = %request.uri().path(), "Rejected request");
        })?;

        state.verifier.verify(token).map_err(|err| {
            tracing::warn!(reason = %err, path = %request.uri().path(), "Rejected bearer token");
            AppError::from(err)
        })?
    };

    tracing::debug!(client_id = identity.client_id, "Authenticated client");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
