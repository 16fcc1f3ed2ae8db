// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod token;

pub use token::{ClientIdentity, TokenError, TokenVerifier};
