// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito user pool operations.
//!
//! Handlers talk to the pool through the [`UserPool`] trait so they can be
//! tested without AWS. [`CognitoUserPool`] is the production implementation
//! backed by `aws-sdk-cognitoidentityprovider`.
//!
//! Calls keyed by username (sign-up, sign-in, confirmations, password reset)
//! carry a `SECRET_HASH` when the app client has a secret. Calls keyed by an
//! access token (change password, get/update attributes) do not.

pub mod client;
pub mod error;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use client::{secret_hash, CognitoUserPool};
pub use error::ProviderError;

// =============================================================================
// Types
// =============================================================================

/// Where Cognito sent a verification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeDelivery {
    /// Masked destination, e.g. `u***@e***`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// `EMAIL` or `SMS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_medium: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
}

/// Outcome of registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResult {
    /// Cognito `sub` of the new user
    pub user_sub: String,

    /// False until the confirmation code is submitted
    pub user_confirmed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_delivery: Option<CodeDelivery>,
}

/// Tokens issued by a successful sign-in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime of the ID and access tokens in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("id_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// A Cognito user attribute (`email`, `name`, `birthdate`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserAttribute {
    pub name: String,
    pub value: String,
}

impl UserAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The caller's pool record as returned by `GetUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    /// Attribute name to value, e.g. `email_verified` -> `"true"`
    pub attributes: BTreeMap<String, String>,
}

// =============================================================================
// UserPool
// =============================================================================

/// Operations the API performs against the user pool.
#[async_trait]
pub trait UserPool: Send + Sync {
    /// Register a new user with `email` as the username.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &[UserAttribute],
    ) -> Result<SignUpResult, ProviderError>;

    /// Password sign-in (`USER_PASSWORD_AUTH`).
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, ProviderError>;

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderError>;

    async fn forgot_password(&self, email: &str) -> Result<Option<CodeDelivery>, ProviderError>;

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ProviderError>;

    async fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> Result<Option<CodeDelivery>, ProviderError>;

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ProviderError>;

    /// Returns the deliveries triggered by changed verifiable attributes.
    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: &[UserAttribute],
    ) -> Result<Vec<CodeDelivery>, ProviderError>;

    async fn get_user(&self, access_token: &str) -> Result<UserProfile, ProviderError>;
}
