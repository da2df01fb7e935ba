// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token and token kind types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two token kinds a Cognito user pool issues to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TokenKind {
    /// ID token: carries identity claims (`email`, `name`, ...), `aud` is the client ID.
    Identity,
    /// Access token: authorizes user-pool API calls, carries `client_id` and `username`.
    Access,
}

impl TokenKind {
    /// Value of the Cognito `token_use` claim for this kind.
    pub fn token_use(self) -> &'static str {
        match self {
            TokenKind::Identity => "id",
            TokenKind::Access => "access",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Identity => write!(f, "identity"),
            TokenKind::Access => write!(f, "access"),
        }
    }
}

/// Raw bearer credential taken from the `Authorization` header.
///
/// Opaque until verified. `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(<{} bytes>)", self.0.len())
    }
}
