// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applies the guard to a whole router subtree. Requests without a valid
//! bearer token are answered with 401 before reaching the handler; accepted
//! requests carry an [`AuthContext`](super::AuthContext) in their extensions.
//!
//! ```rust,ignore
//! let guarded = Router::new()
//!     .route("/auth/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::extractor::authenticate;
use crate::state::AppState;

/// Authentication middleware function.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state.resolver).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => {
            debug!(path = %request.uri().path(), error_code = e.error_code(), "request rejected");
            e.into_response()
        }
    }
}
