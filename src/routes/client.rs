// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client training session routes.

use crate::error::{AppError, Result};
use crate::models::{CreateSessionRequest, NewTrainingSession, TrainingSession};
use crate::services::ClientIdentity;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const STATUS_OK: &str = "ok";
const NO_SESSIONS_MESSAGE: &str = "Client has no training sessions yet";

/// Routes open without a token.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/client/new_trainer", post(create_session))
}

/// Routes scoped to the authenticated client.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/client/my_trains", get(list_my_sessions))
        .route("/client/my_trains/{train_id}", get(get_my_session))
        .route("/client/toggle_ready/{train_id}", put(toggle_ready))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateSessionResponse {
    pub status: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
}

/// Record a new training session.
async fn create_session(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<CreateSessionRequest>, AppError>,
) -> Result<Json<CreateSessionResponse>> {
    let session = NewTrainingSession::try_from(request)?;
    let created = state.store.create(session).await?;

    Ok(Json(CreateSessionResponse {
        status: STATUS_OK.to_string(),
        id: created.id,
    }))
}

// ─── List / Fetch ────────────────────────────────────────────

/// Either the client's sessions, or an explicit empty marker.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(untagged)]
pub enum MySessionsResponse {
    Sessions(Vec<TrainingSession>),
    Empty {
        trains: Vec<TrainingSession>,
        message: String,
    },
}

/// List every session owned by the caller.
async fn list_my_sessions(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientIdentity>,
) -> Result<Json<MySessionsResponse>> {
    let sessions = state.store.list_by_owner(client.client_id).await?;

    tracing::debug!(
        client_id = client.client_id,
        count = sessions.len(),
        "Listed training sessions"
    );

    if sessions.is_empty() {
        return Ok(Json(MySessionsResponse::Empty {
            trains: vec![],
            message: NO_SESSIONS_MESSAGE.to_string(),
        }));
    }

    Ok(Json(MySessionsResponse::Sessions(sessions)))
}

/// Fetch one owned session.
async fn get_my_session(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientIdentity>,
    WithRejection(Path(train_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<TrainingSession>> {
    let session = state
        .store
        .find_by_id_for_owner(train_id, client.client_id)
        .await?;
    Ok(Json(session))
}

// ─── Toggle ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleReadyResponse {
    pub status: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub train_id: i64,
    pub new_is_ready: bool,
}

/// Flip the completion flag on an owned session.
async fn toggle_ready(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientIdentity>,
    WithRejection(Path(train_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<ToggleReadyResponse>> {
    let session = state
        .store
        .toggle_ready(train_id, client.client_id)
        .await?;

    Ok(Json(ToggleReadyResponse {
        status: STATUS_OK.to_string(),
        train_id: session.id,
        new_is_ready: session.is_ready,
    }))
}
