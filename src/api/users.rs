// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Current-user endpoint.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, AuthContext, TokenKind, UserIdentity};

/// Response for GET /auth/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Normalized identity from the verified token
    #[serde(flatten)]
    pub identity: UserIdentity,
    /// Which kind of token authenticated the request
    pub token_kind: TokenKind,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
}

impl From<AuthContext> for MeResponse {
    fn from(context: AuthContext) -> Self {
        Self {
            identity: context.identity,
            token_kind: context.token_kind,
            expires_at: context.expires_at,
        }
    }
}

/// Get the current authenticated user's identity.
///
/// Answered from the verified token alone; Cognito is not called.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User identity", body = MeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn me(Auth(context): Auth) -> Json<MeResponse> {
    Json(context.into())
}
