// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cognito bearer-token authentication for the API.
//!
//! ## Auth Flow
//!
//! 1. Client signs in through `POST /auth/signin` and receives an ID, access
//!    and refresh token from Cognito
//! 2. Client sends `Authorization: Bearer <ID or access token>`
//! 3. Server:
//!    - Fetches the user pool JWKS via HTTPS (cached)
//!    - Tries the token as an ID token, then as an access token
//!    - Verifies signature, expiry, issuer, `token_use`, and the app client
//!      (`aud` for ID tokens, `client_id` for access tokens)
//!    - Normalizes the claims into a [`UserIdentity`] and attaches an
//!      [`AuthContext`] to the request
//!
//! ## Security
//!
//! - Every verification failure is reported as `invalid_token`; the reason is
//!   only logged at debug level
//! - JWKS fetching is HTTPS-only outside loopback
//! - JWKS is cached with TTL; an unknown `kid` triggers a rate-limited refresh
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod resolver;
pub mod token;
pub mod verifier;

pub use claims::{normalize, AuthContext, UserIdentity, VerifiedClaims};
pub use error::AuthError;
pub use extractor::{authenticate, bearer_token, AccessAuth, Auth};
pub use jwks::{JwksError, JwksManager, KeySetStatus};
pub use middleware::require_auth;
pub use resolver::{ResolvedToken, TokenResolver, ATTEMPT_ORDER};
pub use token::{BearerToken, TokenKind};
pub use verifier::{ClaimsVerifier, VerifyError};
