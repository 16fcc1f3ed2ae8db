// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::services::TokenError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

const JSON_DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authorization header is missing")]
    AuthHeaderMissing,

    #[error("Authorization header must be 'Bearer <token>'")]
    AuthHeaderMalformed,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Invalid request: {detail}")]
    Validation { fields: Vec<String>, detail: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable code sent in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::AuthHeaderMissing => "auth_header_missing",
            AppError::AuthHeaderMalformed => "auth_header_malformed",
            AppError::TokenExpired => "token_expired",
            AppError::TokenInvalid => "token_invalid",
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthHeaderMissing
            | AppError::AuthHeaderMalformed
            | AppError::TokenExpired
            | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code();

        let (detail, fields) = match self {
            AppError::Validation { fields, detail } => (detail, fields),
            AppError::StorageUnavailable(msg) => {
                tracing::error!(error = %msg, "Storage unavailable");
                ("Storage is temporarily unavailable".to_string(), vec![])
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("Internal server error".to_string(), vec![])
            }
            other => (other.to_string(), vec![]),
        };

        let body = ErrorResponse {
            error,
            detail,
            fields,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed(_) | TokenError::InvalidSignature | TokenError::MissingIdentity => {
                AppError::TokenInvalid
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Training session not found".to_string()),
            StoreError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            corrupt @ StoreError::Corrupt { .. } => AppError::Internal(corrupt.into()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_paths(&errors, "", &mut fields);
        fields.sort();

        AppError::Validation {
            detail: format!("Invalid fields: {}", fields.join(", ")),
            fields,
        }
    }
}

/// Flatten nested validator errors into paths like `exercises[1].sets`.
fn collect_field_paths(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(_) => out.push(path),
            ValidationErrorsKind::Struct(inner) => collect_field_paths(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_paths(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        let fields = match &rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&detail).into_iter().collect(),
            _ => vec![],
        };

        AppError::Validation { fields, detail }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation {
            fields: vec!["train_id".to_string()],
            detail: rejection.body_text(),
        }
    }
}

/// Recover the offending field path from a JSON data error message, e.g.
/// `exercises[0].sets: invalid type ...` or `missing field `typetrain``.
fn rejected_field(detail: &str) -> Option<String> {
    let rest = detail.strip_prefix(JSON_DATA_ERROR_PREFIX).unwrap_or(detail);

    // Paths never contain spaces; error messages always do.
    let (path, message) = match rest.split_once(": ") {
        Some((head, tail)) if !head.contains(' ') => (head, tail),
        _ => ("", rest),
    };

    let missing = message
        .strip_prefix("missing field `")
        .and_then(|m| m.split('`').next());

    match (path, missing) {
        ("", Some(field)) => Some(field.to_string()),
        ("", None) => None,
        (path, Some(field)) => Some(format!("{path}.{field}")),
        (path, None) => Some(path.to_string()),
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
