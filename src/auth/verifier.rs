// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-kind Cognito token verification.
//!
//! A [`ClaimsVerifier`] is bound to one [`TokenKind`]. The two profiles differ
//! in how the app client is checked:
//!
//! - ID tokens carry the client ID in `aud`
//! - access tokens carry no `aud`; the client ID is in `client_id`
//!
//! Both check the RS256 signature against the pool's JWKS, `exp` (with 60s
//! leeway), `iss`, and `token_use`.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::VerifiedClaims;
use super::jwks::{JwksError, JwksManager};
use super::token::{BearerToken, TokenKind};
use crate::config::CognitoConfig;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Why a token was rejected. Internal only; callers see `AuthError::InvalidToken`.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("token is malformed")]
    Malformed,

    #[error("token header has no kid")]
    MissingKeyId,

    #[error(transparent)]
    KeySet(#[from] JwksError),

    #[error("signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("issuer mismatch")]
    InvalidIssuer,

    #[error("audience mismatch")]
    InvalidAudience,

    #[error("required claim '{0}' is missing")]
    MissingClaim(String),

    #[error("token_use is '{found}', expected '{expected}'")]
    WrongTokenUse { expected: &'static str, found: String },

    #[error("client_id mismatch")]
    InvalidClient,

    #[error("subject is empty")]
    EmptySubject,
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
            ErrorKind::InvalidIssuer => VerifyError::InvalidIssuer,
            ErrorKind::InvalidAudience => VerifyError::InvalidAudience,
            ErrorKind::ImmatureSignature => VerifyError::NotYetValid,
            ErrorKind::MissingRequiredClaim(claim) => VerifyError::MissingClaim(claim.clone()),
            _ => VerifyError::Malformed,
        }
    }
}

/// Verifier for one token kind.
pub struct ClaimsVerifier {
    kind: TokenKind,
    issuer: String,
    client_id: String,
    jwks: Arc<JwksManager>,
}

impl ClaimsVerifier {
    pub fn new(kind: TokenKind, config: &CognitoConfig, jwks: Arc<JwksManager>) -> Self {
        Self {
            kind,
            issuer: config.issuer(),
            client_id: config.client_id.clone(),
            jwks,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);

        match self.kind {
            TokenKind::Identity => {
                validation.set_audience(&[&self.client_id]);
                validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);
            }
            TokenKind::Access => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&["exp", "iss", "sub"]);
            }
        }

        validation
    }

    /// Verify `token` as this verifier's kind.
    pub async fn verify(&self, token: &BearerToken) -> Result<VerifiedClaims, VerifyError> {
        let header = decode_header(token.as_str()).map_err(|_| VerifyError::Malformed)?;
        let kid = header.kid.as_deref().ok_or(VerifyError::MissingKeyId)?;

        let (decoding_key, algorithm) = self.jwks.get_decoding_key(kid).await?;
        let token_data =
            decode::<VerifiedClaims>(token.as_str(), &decoding_key, &self.validation(algorithm))?;
        let claims = token_data.claims;

        let expected = self.kind.token_use();
        if claims.token_use != expected {
            return Err(VerifyError::WrongTokenUse {
                expected,
                found: claims.token_use,
            });
        }

        if self.kind == TokenKind::Access && claims.client_id.as_deref() != Some(self.client_id.as_str())
        {
            return Err(VerifyError::InvalidClient);
        }

        if claims.sub.trim().is_empty() {
            return Err(VerifyError::EmptySubject);
        }

        Ok(claims)
    }
}
