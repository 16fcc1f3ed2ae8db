// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training session model: wire payloads and the validated domain input.

use crate::time_utils::time_of_day;
use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError, ValidationErrors};

/// Category of a training session.
///
/// Persisted as its lowercase name, so new categories need no schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum TrainingType {
    Abs,
    Glutes,
    Arms,
    Back,
    Legs,
    Chest,
    Cardio,
    Stretch,
}

impl TrainingType {
    pub const ALL: [TrainingType; 8] = [
        TrainingType::Abs,
        TrainingType::Glutes,
        TrainingType::Arms,
        TrainingType::Back,
        TrainingType::Legs,
        TrainingType::Chest,
        TrainingType::Cardio,
        TrainingType::Stretch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingType::Abs => "abs",
            TrainingType::Glutes => "glutes",
            TrainingType::Arms => "arms",
            TrainingType::Back => "back",
            TrainingType::Legs => "legs",
            TrainingType::Chest => "chest",
            TrainingType::Cardio => "cardio",
            TrainingType::Stretch => "stretch",
        }
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown training type: {0:?}")]
pub struct UnknownTrainingType(pub String);

impl FromStr for TrainingType {
    type Err = UnknownTrainingType;

    /// Case-insensitive match against the known categories.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TrainingType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTrainingType(s.to_string()))
    }
}

/// One exercise within a session.
///
/// Counts are recorded as given; a session may log zero of anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
}

/// A stored training session as returned to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrainingSession {
    /// Store-assigned, immutable
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    /// Owning client, immutable
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub client_id: i64,
    pub typetrain: TrainingType,
    /// When the session takes place
    pub date_train_time: DateTime<FixedOffset>,
    #[serde(with = "time_of_day")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub time_train: NaiveTime,
    #[serde(with = "time_of_day")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_time: NaiveTime,
    pub exercises: Vec<Exercise>,
    /// Completion flag, flipped by the toggle endpoint
    pub is_ready: bool,
}

/// Body of `POST /client/new_trainer`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateSessionRequest {
    #[validate(range(min = 1))]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub client_id: i64,
    #[validate(custom(function = "validate_training_type"))]
    pub typetrain: String,
    pub date_train_time: DateTime<FixedOffset>,
    #[serde(with = "time_of_day")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub time_train: NaiveTime,
    #[serde(with = "time_of_day")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_time: NaiveTime,
    /// May be empty, e.g. for cardio
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub is_ready: bool,
}

fn validate_training_type(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TrainingType>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_training_type"))
}

/// Validated input for creating a session.
///
/// Only obtainable through `TryFrom<CreateSessionRequest>`, so a store never
/// sees an unchecked payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrainingSession {
    client_id: i64,
    typetrain: TrainingType,
    date_train_time: DateTime<FixedOffset>,
    time_train: NaiveTime,
    end_time: NaiveTime,
    exercises: Vec<Exercise>,
    is_ready: bool,
}

impl TryFrom<CreateSessionRequest> for NewTrainingSession {
    type Error = ValidationErrors;

    fn try_from(request: CreateSessionRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let typetrain = request.typetrain.parse::<TrainingType>().map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.add("typetrain", ValidationError::new("unknown_training_type"));
            errors
        })?;

        Ok(Self {
            client_id: request.client_id,
            typetrain,
            date_train_time: request.date_train_time,
            time_train: request.time_train,
            end_time: request.end_time,
            exercises: request.exercises,
            is_ready: request.is_ready,
        })
    }
}

impl NewTrainingSession {
    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn typetrain(&self) -> TrainingType {
        self.typetrain
    }

    pub fn date_train_time(&self) -> DateTime<FixedOffset> {
        self.date_train_time
    }

    pub fn time_train(&self) -> NaiveTime {
        self.time_train
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Attach a store-assigned id, producing the stored entity.
    pub fn into_session(self, id: i64) -> TrainingSession {
        TrainingSession {
            id,
            client_id: self.client_id,
            typetrain: self.typetrain,
            date_train_time: self.date_train_time,
            time_train: self.time_train,
            end_time: self.end_time,
            exercises: self.exercises,
            is_ready: self.is_ready,
        }
    }
}
