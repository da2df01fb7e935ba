// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified Cognito claims, the normalized user identity, and the per-request
//! authentication context.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::token::{BearerToken, TokenKind};

/// Claims decoded from a Cognito ID or access token.
///
/// Only produced by [`ClaimsVerifier`](super::ClaimsVerifier) after the
/// signature, expiry, issuer, audience/client and `token_use` checks pass, so
/// `sub` is always present and non-empty.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedClaims {
    /// Subject - the Cognito user's immutable ID
    pub sub: String,

    /// Issuer (user pool URL)
    pub iss: String,

    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,

    /// `id` or `access`
    pub token_use: String,

    /// Audience (ID tokens only; validated by jsonwebtoken, not read directly)
    #[serde(default)]
    pub aud: Option<Value>,

    /// App client ID (access tokens only)
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Pool username (access tokens only)
    #[serde(default)]
    pub username: Option<String>,

    /// Cognito emits a boolean in ID tokens but some pools emit `"true"`.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub email_verified: Option<bool>,

    /// Everything else (`cognito:username`, `scope`, `auth_time`, custom attributes, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    })
}

/// Normalized identity of the caller, identical in shape for both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Cognito `sub`
    pub user_id: String,

    /// `email`, or `username` when the token has no email (access tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

impl UserIdentity {
    /// Map verified claims from either token kind into a user identity.
    pub fn from_claims(claims: &VerifiedClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone().or_else(|| claims.username.clone()),
            name: claims.name.clone(),
            email_verified: claims.email_verified,
        }
    }
}

/// Shorthand for [`UserIdentity::from_claims`].
pub fn normalize(claims: &VerifiedClaims) -> UserIdentity {
    UserIdentity::from_claims(claims)
}

/// Authentication result attached to a request by the guard.
///
/// Lives only as long as the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: UserIdentity,
    /// The token exactly as presented, for forwarding to Cognito.
    pub raw_token: BearerToken,
    /// Which verification profile accepted the token.
    pub token_kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn new(claims: &VerifiedClaims, token_kind: TokenKind, raw_token: BearerToken) -> Self {
        Self {
            identity: normalize(claims),
            raw_token,
            token_kind,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }
}
