// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process session store for development and tests.

use crate::db::{SessionStore, StoreError};
use crate::models::{NewTrainingSession, TrainingSession};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Session store backed by a concurrent map.
///
/// Ids come from an atomic counter, so they are unique and increasing per
/// store instance. Toggling holds the entry's shard lock for the whole
/// read-flip-write.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<i64, TrainingSession>,
    last_id: AtomicI64,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: NewTrainingSession) -> Result<TrainingSession, StoreError> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let session = session.into_session(id);
        self.sessions.insert(id, session.clone());

        tracing::info!(
            train_id = id,
            client_id = session.client_id,
            "Training session created"
        );
        Ok(session)
    }

    async fn list_by_owner(&self, client_id: i64) -> Result<Vec<TrainingSession>, StoreError> {
        let mut owned: Vec<TrainingSession> = self
            .sessions
            .iter()
            .filter(|entry| entry.client_id == client_id)
            .map(|entry| entry.value().clone())
            .collect();
        owned.sort_by_key(|s| s.id);
        Ok(owned)
    }

    async fn find_by_id_for_owner(
        &self,
        id: i64,
        client_id: i64,
    ) -> Result<TrainingSession, StoreError> {
        self.sessions
            .get(&id)
            .filter(|entry| entry.client_id == client_id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn toggle_ready(&self, id: i64, client_id: i64) -> Result<TrainingSession, StoreError> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .filter(|entry| entry.client_id == client_id)
            .ok_or(StoreError::NotFound)?;

        entry.is_ready = !entry.is_ready;
        let session = entry.value().clone();
        drop(entry);

        tracing::info!(
            train_id = id,
            client_id,
            is_ready = session.is_ready,
            "Training session ready flag toggled"
        );
        Ok(session)
    }
}
