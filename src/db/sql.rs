// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relational session store on Sea-ORM (PostgreSQL in production, SQLite
//! for local development and tests).

use crate::config::Config;
use crate::db::entity::{self, Exercises};
use crate::db::{tables, SessionStore, StoreError};
use crate::models::{NewTrainingSession, TrainingSession};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder, Schema, Set, TransactionTrait,
};
use std::future::Future;
use std::time::Duration;

/// Sea-ORM backed session store.
///
/// Every operation is bounded by `operation_timeout`; a hung database call
/// surfaces as [`StoreError::Unavailable`] instead of pinning the request.
#[derive(Debug, Clone)]
pub struct SqlSessionStore {
    conn: DatabaseConnection,
    operation_timeout: Duration,
}

impl SqlSessionStore {
    /// Wrap an existing connection.
    pub fn new(conn: DatabaseConnection, operation_timeout: Duration) -> Self {
        Self {
            conn,
            operation_timeout,
        }
    }

    /// Open a connection pool using the pool and timeout settings in `config`.
    pub async fn connect(url: &str, config: &Config) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(url.to_owned());
        options
            .max_connections(config.db_max_connections)
            .connect_timeout(config.db_connect_timeout)
            .acquire_timeout(config.db_connect_timeout)
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to database: {e}")))?;

        tracing::info!(
            backend = ?conn.get_database_backend(),
            max_connections = config.db_max_connections,
            "Connected to database"
        );

        Ok(Self::new(conn, config.db_operation_timeout))
    }

    /// Create the sessions table and its owner index if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        self.bounded("ensure_schema", async {
            let mut table = schema.create_table_from_entity(entity::Entity);
            table.if_not_exists();
            self.conn.execute(backend.build(&table)).await?;

            for mut index in schema.create_index_from_entity(entity::Entity) {
                index.if_not_exists();
                self.conn.execute(backend.build(&index)).await?;
            }
            Ok::<_, DbErr>(())
        })
        .await?;

        tracing::info!(table = tables::TRAINING_SESSIONS, "Schema ready");
        Ok(())
    }

    /// Run a database future under the operation timeout.
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(op, error = %e, "Database operation failed");
                Err(StoreError::Unavailable(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    op,
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "Database operation timed out"
                );
                Err(StoreError::Unavailable(format!("{op} timed out")))
            }
        }
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn create(&self, session: NewTrainingSession) -> Result<TrainingSession, StoreError> {
        let model = self
            .bounded("create", async {
                let txn = self.conn.begin().await?;

                let model = entity::ActiveModel {
                    id: NotSet,
                    client_id: Set(session.client_id()),
                    typetrain: Set(session.typetrain().as_str().to_string()),
                    date_train_time: Set(session.date_train_time()),
                    time_train: Set(session.time_train()),
                    end_time: Set(session.end_time()),
                    exercises: Set(Exercises(session.exercises().to_vec())),
                    is_ready: Set(session.is_ready()),
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;
                Ok::<_, DbErr>(model)
            })
            .await?;

        tracing::info!(
            train_id = model.id,
            client_id = model.client_id,
            "Training session created"
        );

        model.try_into()
    }

    async fn list_by_owner(&self, client_id: i64) -> Result<Vec<TrainingSession>, StoreError> {
        let models = self
            .bounded(
                "list_by_owner",
                entity::Entity::find()
                    .filter(entity::Column::ClientId.eq(client_id))
                    .order_by_asc(entity::Column::Id)
                    .all(&self.conn),
            )
            .await?;

        models.into_iter().map(TrainingSession::try_from).collect()
    }

    async fn find_by_id_for_owner(
        &self,
        id: i64,
        client_id: i64,
    ) -> Result<TrainingSession, StoreError> {
        // Id and owner go into one predicate so a foreign row is never loaded.
        self.bounded(
            "find_by_id_for_owner",
            entity::Entity::find_by_id(id)
                .filter(entity::Column::ClientId.eq(client_id))
                .one(&self.conn),
        )
        .await?
        .ok_or(StoreError::NotFound)?
        .try_into()
    }

    async fn toggle_ready(&self, id: i64, client_id: i64) -> Result<TrainingSession, StoreError> {
        let model = self
            .bounded("toggle_ready", async {
                let txn = self.conn.begin().await?;

                // Flip in place rather than read-modify-write, so concurrent
                // toggles serialize on the row lock and none is lost.
                let result = entity::Entity::update_many()
                    .col_expr(
                        entity::Column::IsReady,
                        Expr::col(entity::Column::IsReady).not(),
                    )
                    .filter(entity::Column::Id.eq(id))
                    .filter(entity::Column::ClientId.eq(client_id))
                    .exec(&txn)
                    .await?;

                if result.rows_affected == 0 {
                    txn.rollback().await?;
                    return Ok(None);
                }

                let model = entity::Entity::find_by_id(id)
                    .filter(entity::Column::ClientId.eq(client_id))
                    .one(&txn)
                    .await?;

                txn.commit().await?;
                Ok::<_, DbErr>(model)
            })
            .await?
            .ok_or(StoreError::NotFound)?;

        tracing::info!(
            train_id = model.id,
            client_id = model.client_id,
            is_ready = model.is_ready,
            "Training session ready flag toggled"
        );

        model.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateSessionRequest;
    use serde_json::json;

    async fn memory_sqlite() -> SqlSessionStore {
        let store = SqlSessionStore::connect("sqlite::memory:", &Config::test_default())
            .await
            .expect("Failed to open in-memory SQLite");
        store.ensure_schema().await.expect("Failed to create schema");
        store
    }

    fn new_session(client_id: i64) -> NewTrainingSession {
        let request: CreateSessionRequest = serde_json::from_value(json!({
            "client_id": client_id,
            "typetrain": "legs",
            "date_train_time": "2024-01-01T10:00:00Z",
            "time_train": "10:00",
            "end_time": "11:00",
            "exercises": [{"name": "squat", "sets": 3, "reps": 10}],
            "is_ready": false
        }))
        .unwrap();
        request.try_into().unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_all_fields() {
        let store = memory_sqlite().await;
        let input = new_session(1);

        let created = store.create(input.clone()).await.unwrap();
        assert_eq!(created, input.clone().into_session(created.id));

        let fetched = store.find_by_id_for_owner(created.id, 1).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let store = memory_sqlite().await;
        store.ensure_schema().await.unwrap();
        store.create(new_session(1)).await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.list_by_owner(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_ready_foreign_owner_is_not_found() {
        let store = memory_sqlite().await;
        let created = store.create(new_session(2)).await.unwrap();

        let err = store.toggle_ready(created.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let unchanged = store.find_by_id_for_owner(created.id, 2).await.unwrap();
        assert!(!unchanged.is_ready);
    }

    #[tokio::test]
    async fn test_toggle_ready_flips_and_persists() {
        let store = memory_sqlite().await;
        let created = store.create(new_session(1)).await.unwrap();

        let toggled = store.toggle_ready(created.id, 1).await.unwrap();
        assert!(toggled.is_ready);
        assert!(store.find_by_id_for_owner(created.id, 1).await.unwrap().is_ready);
    }

    #[tokio::test]
    async fn test_closed_connection_is_unavailable() {
        let store = memory_sqlite().await;
        store.conn.clone().close().await.unwrap();

        let err = store.list_by_owner(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_operation_timeout_is_unavailable() {
        let store = memory_sqlite().await;

        // Pin the pool's only connection so the next call cannot acquire one.
        let txn = store.conn.begin().await.unwrap();
        let impatient = SqlSessionStore::new(store.conn.clone(), Duration::from_millis(50));

        let started = tokio::time::Instant::now();
        let err = impatient.list_by_owner(1).await.unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(started.elapsed() < Duration::from_secs(2));

        txn.rollback().await.unwrap();
        assert!(store.list_by_owner(1).await.unwrap().is_empty());
    }
}
