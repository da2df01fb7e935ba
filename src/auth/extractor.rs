// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request authentication guard and Axum extractors.
//!
//! [`authenticate`] is the guard: it reads `Authorization: Bearer <token>`,
//! resolves the token as an ID or access token, and builds the
//! [`AuthContext`]. The `require_auth` middleware runs it for the guarded
//! router; handlers then pick the context up with an extractor:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx.identity.user_id, ctx.token_kind, ctx.raw_token
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use super::{AuthContext, AuthError, BearerToken, TokenKind, TokenResolver};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw bearer token from request headers.
///
/// Anything other than `Bearer ` followed by at least one character is
/// treated as missing credentials.
pub fn bearer_token(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MissingCredentials)?;

    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(BearerToken::new(token)),
        _ => Err(AuthError::MissingCredentials),
    }
}

/// Authenticate a request from its headers.
pub async fn authenticate(
    headers: &HeaderMap,
    resolver: &TokenResolver,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let resolved = resolver.resolve(&token).await?;
    let context = AuthContext::new(&resolved.claims, resolved.kind, token);

    debug!(
        user_id = %context.identity.user_id,
        token_kind = %context.token_kind,
        "request authenticated"
    );
    Ok(context)
}

/// Extractor for the authenticated caller, with either token kind.
///
/// Reuses the context attached by the `require_auth` middleware when present,
/// otherwise authenticates the request itself.
pub struct Auth(pub AuthContext);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<AuthContext>().cloned() {
            return Ok(Auth(context));
        }

        let context = authenticate(&parts.headers, &state.resolver).await?;
        parts.extensions.insert(context.clone());
        Ok(Auth(context))
    }
}

/// Extractor that requires an access token.
///
/// Cognito's user-scoped APIs (change password, get/update attributes) only
/// accept access tokens.
pub struct AccessAuth(pub AuthContext);

impl FromRequestParts<AppState> for AccessAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(context) = Auth::from_request_parts(parts, state).await?;

        if context.token_kind != TokenKind::Access {
            return Err(AuthError::AccessTokenRequired);
        }

        Ok(AccessAuth(context))
    }
}
