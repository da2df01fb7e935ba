// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the `/auth` endpoints. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation. Field names are camelCase on the wire, except the
//! Cognito-standard `phone_number` attribute.
//!
//! ## Validation
//!
//! Request types expose `validate(self) -> Result<Self, ApiError>`, which
//! checks every field and returns the request with emails trimmed and
//! lower-cased. Handlers only forward validated requests to the user pool.
//!
//! ## Model Categories
//!
//! - **Registration**: sign-up, confirmation, resending the code
//! - **Sign-in**: credentials and issued tokens
//! - **Passwords**: forgot/confirm-forgot, change
//! - **Profile**: attribute updates and retrieval

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cognito::{AuthTokens, CodeDelivery, SignUpResult, UserAttribute, UserProfile};
use crate::error::ApiError;

/// Minimum password length accepted before calling Cognito.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Confirmation codes are exactly this many ASCII digits.
pub const CONFIRMATION_CODE_LENGTH: usize = 6;

// =============================================================================
// Field Helpers
// =============================================================================

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose structural email check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Mask an email for logs: `user@example.com` -> `u**r@e*********m`.
pub fn mask_email(email: &str) -> String {
    fn mask(part: &str) -> String {
        let chars: Vec<char> = part.chars().collect();
        match chars.len() {
            0 => String::new(),
            1 => "*".to_string(),
            2 => format!("{}*", chars[0]),
            n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
        }
    }

    match email.split_once('@') {
        Some((local, domain)) => format!("{}@{}", mask(local), mask(domain)),
        None => mask(email),
    }
}

fn validated_email(email: &str) -> Result<String, ApiError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("email must be a valid email address"));
    }
    Ok(email)
}

fn check_new_password(field: &str, password: &str) -> Result<(), ApiError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(ApiError::bad_request(format!(
            "{field} must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }
    Ok(())
}

fn check_required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

fn validated_code(code: &str) -> Result<String, ApiError> {
    let code = code.trim();
    if code.len() != CONFIRMATION_CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "code must be exactly {CONFIRMATION_CODE_LENGTH} digits"
        )));
    }
    Ok(code.to_string())
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Registration
// =============================================================================

/// Request body for `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUpRequest {
    /// Email address, also used as the Cognito username.
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    /// At least 8 characters; the pool's password policy applies on top.
    #[schema(example = "Password123!")]
    pub password: String,
    /// Optional display name, stored as the `name` attribute.
    #[serde(default)]
    #[schema(example = "John Doe")]
    pub name: Option<String>,
}

impl SignUpRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        let email = validated_email(&self.email)?;
        check_new_password("password", &self.password)?;
        Ok(Self {
            email,
            password: self.password,
            name: non_blank(self.name),
        })
    }

    /// Attributes sent to Cognito: `email`, plus `name` when given.
    pub fn attributes(&self) -> Vec<UserAttribute> {
        let mut attributes = vec![UserAttribute::new("email", &self.email)];
        if let Some(name) = &self.name {
            attributes.push(UserAttribute::new("name", name));
        }
        attributes
    }
}

/// Response body for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    #[schema(example = "User created successfully")]
    pub message: String,
    pub user: SignUpResult,
}

/// Request body for `POST /auth/confirm-signup`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmSignUpRequest {
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    /// 6-digit code from the confirmation email.
    #[schema(example = "123456")]
    pub code: String,
}

impl ConfirmSignUpRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        Ok(Self {
            email: validated_email(&self.email)?,
            code: validated_code(&self.code)?,
        })
    }
}

/// Request body for `POST /auth/resend-confirmation`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResendConfirmationRequest {
    #[schema(example = "john.doe@example.com")]
    pub email: String,
}

impl ResendConfirmationRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        Ok(Self {
            email: validated_email(&self.email)?,
        })
    }
}

// =============================================================================
// Sign-in
// =============================================================================

/// Request body for `POST /auth/signin`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = "Password123!")]
    pub password: String,
}

impl SignInRequest {
    /// Only presence is checked for the password; Cognito judges it.
    pub fn validate(self) -> Result<Self, ApiError> {
        let email = validated_email(&self.email)?;
        check_required("password", &self.password)?;
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// Response body for `POST /auth/signin`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    #[schema(example = "Authentication successful")]
    pub message: String,
    /// ID, access and refresh tokens. Send the access token as
    /// `Authorization: Bearer` to the profile endpoints.
    pub token: AuthTokens,
}

// =============================================================================
// Passwords
// =============================================================================

/// Request body for `POST /auth/forgot-password`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[schema(example = "john.doe@example.com")]
    pub email: String,
}

impl ForgotPasswordRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        Ok(Self {
            email: validated_email(&self.email)?,
        })
    }
}

/// Request body for `POST /auth/confirm-forgot-password`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmForgotPasswordRequest {
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = "123456")]
    pub code: String,
    #[schema(example = "NewPassword123!")]
    pub new_password: String,
}

impl ConfirmForgotPasswordRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        let email = validated_email(&self.email)?;
        let code = validated_code(&self.code)?;
        check_new_password("newPassword", &self.new_password)?;
        Ok(Self {
            email,
            code,
            new_password: self.new_password,
        })
    }
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[schema(example = "OldPassword123!")]
    pub current_password: String,
    #[schema(example = "NewPassword123!")]
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        check_required("currentPassword", &self.current_password)?;
        check_new_password("newPassword", &self.new_password)?;
        Ok(self)
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Request body for `PUT /auth/profile`. Only supplied fields are changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(example = "john.doe@example.com")]
    pub email: Option<String>,
    /// MM/DD/YYYY
    #[serde(default)]
    #[schema(example = "01/01/1990")]
    pub birthdate: Option<String>,
    #[serde(default)]
    #[schema(example = "+1234567890")]
    pub phone_number: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        let email = match non_blank(self.email) {
            Some(email) => Some(validated_email(&email)?),
            None => None,
        };

        let request = Self {
            name: non_blank(self.name),
            email,
            birthdate: non_blank(self.birthdate),
            phone_number: non_blank(self.phone_number),
        };

        if request.attributes().is_empty() {
            return Err(ApiError::bad_request(
                "at least one of name, email, birthdate or phone_number is required",
            ));
        }
        Ok(request)
    }

    /// The supplied fields as Cognito attributes.
    pub fn attributes(&self) -> Vec<UserAttribute> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("birthdate", &self.birthdate),
            ("phone_number", &self.phone_number),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| UserAttribute::new(name, v)))
        .collect()
    }
}

/// Response body for `PUT /auth/profile`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    #[schema(example = "Profile successfully updated")]
    pub message: String,
    /// Verification codes sent for changed email/phone attributes.
    pub code_deliveries: Vec<CodeDelivery>,
}

/// Response body for `GET /auth/profile`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GetProfileResponse {
    #[schema(example = "Profile retrieved successfully")]
    pub message: String,
    pub user: UserProfile,
}

// =============================================================================
// Generic Responses
// =============================================================================

/// A bare success message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Success message plus where the code was sent, if Cognito said.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeDeliveryResponse {
    #[schema(example = "Password reset code sent to your email")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_delivery: Option<CodeDelivery>,
}
