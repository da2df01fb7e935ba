// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenResolver;
use crate::cognito::UserPool;

#[derive(Clone)]
pub struct AppState {
    /// Shared by every request; holds the JWKS cache.
    pub resolver: Arc<TokenResolver>,
    pub user_pool: Arc<dyn UserPool>,
}

impl AppState {
    pub fn new(resolver: TokenResolver, user_pool: Arc<dyn UserPool>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            user_pool,
        }
    }
}
