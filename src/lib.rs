// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainlog: personal training session log for clients.
//!
//! This crate provides the backend API that records training sessions and
//! lets an authenticated client list their own sessions and mark them done.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SessionStore;
use services::TokenVerifier;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub verifier: TokenVerifier,
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Wire the verifier from `config` to the given store.
    pub fn new(config: Config, store: Arc<dyn SessionStore>) -> Self {
        let verifier = TokenVerifier::from_config(&config);
        Self {
            config,
            verifier,
            store,
        }
    }
}
