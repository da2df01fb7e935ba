// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito Auth Server - REST authentication service over an AWS Cognito user pool
//!
//! Exposes sign-up, sign-in, confirmation, password and profile endpoints, and
//! guards protected routes with a bearer check that accepts either a Cognito
//! ID token or access token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification, dual-token resolution and the request guard
//! - `cognito` - User pool operations (AWS SDK)
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod cognito;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;

#[cfg(test)]
pub mod test_support;
