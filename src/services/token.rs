// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token verification for client requests.
//!
//! Tokens are issued by the external identity service and signed with a
//! shared HMAC secret. This module only verifies them: signature first,
//! then expiry, then the client identity claim.

use crate::config::Config;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

const CLOCK_SKEW_SECS: u64 = 60;

/// Client identity extracted from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_id: i64,
}

/// Token verification failure categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a decodable JWT, or required claims are missing/mistyped.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature valid, `exp` in the past.
    #[error("token has expired")]
    Expired,

    /// Signature does not verify under the configured key and algorithm.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Verified token carries no usable client id.
    #[error("token does not identify a client")]
    MissingIdentity,
}

/// Identity claim as written by the issuer: a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdClaim {
    Number(i64),
    Text(String),
}

impl IdClaim {
    fn client_id(&self) -> Option<i64> {
        let id = match self {
            IdClaim::Number(n) => *n,
            IdClaim::Text(s) => s.trim().parse().ok()?,
        };
        (id > 0).then_some(id)
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    /// Client id as issued by the identity service
    #[serde(default)]
    id: Option<IdClaim>,
    /// Standard subject, used when `id` is absent
    #[serde(default)]
    sub: Option<IdClaim>,
}

/// Verifies client bearer tokens against the configured secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Accept only tokens signed with `algorithm` under `secret`.
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        validation.leeway = CLOCK_SKEW_SECS;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_algorithm)
    }

    /// Verify `token` and return the client it was issued to.
    ///
    /// No claim is read before the signature checks out, so a forged token
    /// reports `InvalidSignature` even if its `exp` is also stale.
    pub fn verify(&self, token: &str) -> Result<ClientIdentity, TokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                // A token signed with another algorithm cannot verify under ours.
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        let client_id = claims
            .id
            .as_ref()
            .or(claims.sub.as_ref())
            .and_then(IdClaim::client_id)
            .ok_or(TokenError::MissingIdentity)?;

        Ok(ClientIdentity { client_id })
    }
}
