// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dual-token resolution.
//!
//! A bearer token of unknown kind is tried against each verification profile
//! in [`ATTEMPT_ORDER`]. The first profile that accepts it determines the
//! token's [`TokenKind`]. If none do, the caller gets a single
//! [`AuthError::InvalidToken`] regardless of why each attempt failed.
//!
//! Signing-key lookup depends only on the token header, so a key-set failure
//! ends resolution without trying the remaining kinds.

use std::sync::Arc;

use tracing::debug;

use super::claims::VerifiedClaims;
use super::error::AuthError;
use super::jwks::{JwksError, JwksManager};
use super::token::{BearerToken, TokenKind};
use super::verifier::{ClaimsVerifier, VerifyError};
use crate::config::CognitoConfig;

/// Kinds tried, in order. ID tokens come first as the more common case.
pub const ATTEMPT_ORDER: [TokenKind; 2] = [TokenKind::Identity, TokenKind::Access];

/// Claims of a resolved token, tagged with the kind that accepted it.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub claims: VerifiedClaims,
    pub kind: TokenKind,
}

/// Holds one verifier per token kind over a shared JWKS cache.
pub struct TokenResolver {
    attempts: Vec<ClaimsVerifier>,
    jwks: Arc<JwksManager>,
}

impl TokenResolver {
    /// Build both verifiers for the configured user pool and app client.
    pub fn new(config: &CognitoConfig) -> Result<Self, JwksError> {
        let jwks = JwksManager::new(&config.jwks_url)?.with_cache_ttl(config.jwks_cache_ttl);
        Ok(Self::with_jwks(config, Arc::new(jwks)))
    }

    pub fn with_jwks(config: &CognitoConfig, jwks: Arc<JwksManager>) -> Self {
        let attempts = ATTEMPT_ORDER
            .iter()
            .map(|&kind| ClaimsVerifier::new(kind, config, Arc::clone(&jwks)))
            .collect();
        Self { attempts, jwks }
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Verify `token` as exactly `kind`.
    pub async fn verify(
        &self,
        token: &BearerToken,
        kind: TokenKind,
    ) -> Result<VerifiedClaims, AuthError> {
        let verifier = self
            .attempts
            .iter()
            .find(|v| v.kind() == kind)
            .ok_or(AuthError::InvalidToken)?;

        verifier.verify(token).await.map_err(|reason| {
            debug!(%kind, %reason, "token rejected");
            AuthError::InvalidToken
        })
    }

    /// Verify `token` as whichever kind accepts it.
    pub async fn resolve(&self, token: &BearerToken) -> Result<ResolvedToken, AuthError> {
        for verifier in &self.attempts {
            match verifier.verify(token).await {
                Ok(claims) => {
                    return Ok(ResolvedToken {
                        claims,
                        kind: verifier.kind(),
                    })
                }
                Err(VerifyError::KeySet(reason)) => {
                    debug!(kind = %verifier.kind(), %reason, "signing key unavailable");
                    break;
                }
                Err(reason) => debug!(kind = %verifier.kind(), %reason, "token rejected"),
            }
        }

        Err(AuthError::InvalidToken)
    }
}
