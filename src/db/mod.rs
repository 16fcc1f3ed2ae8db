// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer for training sessions.
//!
//! Every read and write is scoped to the owning client: a session that
//! belongs to someone else is reported exactly like one that does not exist.

pub mod entity;
pub mod memory;
pub mod sql;

pub use memory::MemorySessionStore;
pub use sql::SqlSessionStore;

use crate::config::Config;
use crate::models::{NewTrainingSession, TrainingSession};
use async_trait::async_trait;
use std::sync::Arc;

/// Table names as constants.
pub mod tables {
    pub const TRAINING_SESSIONS: &str = "users_trainer";
}

/// Store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No session with this id belongs to this client.
    #[error("training session not found")]
    NotFound,

    /// Connection, driver, or timeout failure. Not retried here.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back to the domain model.
    #[error("corrupt stored session {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// Owner-scoped persistence for training sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session and return it with its assigned id.
    async fn create(&self, session: NewTrainingSession) -> Result<TrainingSession, StoreError>;

    /// All sessions owned by `client_id`. Empty when there are none.
    async fn list_by_owner(&self, client_id: i64) -> Result<Vec<TrainingSession>, StoreError>;

    /// The session `id` if and only if it is owned by `client_id`.
    async fn find_by_id_for_owner(
        &self,
        id: i64,
        client_id: i64,
    ) -> Result<TrainingSession, StoreError>;

    /// Atomically flip `is_ready` on an owned session and return the result.
    async fn toggle_ready(&self, id: i64, client_id: i64) -> Result<TrainingSession, StoreError>;
}

/// Build the store selected by configuration.
///
/// With `DATABASE_URL` set the SQL store is used and its schema created if
/// missing; otherwise sessions live in memory for the life of the process.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn SessionStore>, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = SqlSessionStore::connect(url, config).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions are kept in memory only");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}
