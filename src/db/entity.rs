// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sea-ORM entity for the training session table.
//!
//! | Column          | Type                 | Notes                     |
//! |-----------------|----------------------|---------------------------|
//! | id              | BIGINT (PK, serial)  | assigned on insert        |
//! | client_id       | BIGINT, indexed      | owner, no foreign key     |
//! | typetrain       | TEXT                 | `TrainingType` name       |
//! | date_train_time | TIMESTAMPTZ          |                           |
//! | time_train      | TIME                 |                           |
//! | end_time        | TIME                 |                           |
//! | exercises       | JSON                 | `[{name, sets, reps}]`    |
//! | is_ready        | BOOLEAN              |                           |

use crate::db::StoreError;
use crate::models::{Exercise, TrainingSession, TrainingType};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users_trainer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(indexed)]
    pub client_id: i64,
    pub typetrain: String,
    pub date_train_time: DateTimeWithTimeZone,
    pub time_train: Time,
    pub end_time: Time,
    #[sea_orm(column_type = "Json")]
    pub exercises: Exercises,
    pub is_ready: bool,
}

/// Exercise list stored as a single JSON column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Exercises(pub Vec<Exercise>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for TrainingSession {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let typetrain = model
            .typetrain
            .parse::<TrainingType>()
            .map_err(|e| StoreError::Corrupt {
                id: model.id,
                reason: e.to_string(),
            })?;

        Ok(TrainingSession {
            id: model.id,
            client_id: model.client_id,
            typetrain,
            date_train_time: model.date_train_time,
            time_train: model.time_train,
            end_time: model.end_time,
            exercises: model.exercises.0,
            is_ready: model.is_ready,
        })
    }
}
