// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod session;

pub use session::{
    CreateSessionRequest, Exercise, NewTrainingSession, TrainingSession, TrainingType,
};
