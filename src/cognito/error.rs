// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito error mapping.

use aws_sdk_cognitoidentityprovider::error::{ProvideErrorMetadata, SdkError};
use axum::http::StatusCode;

/// Errors from user pool operations.
///
/// Named Cognito exceptions get a fixed, user-facing message. Anything else
/// keeps the provider's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("User already exists with this email")]
    UsernameExists,

    #[error("Password does not meet requirements")]
    InvalidPassword,

    #[error("Invalid input parameters")]
    InvalidParameter,

    #[error("Incorrect email or password")]
    NotAuthorized,

    #[error("Please confirm your email before signing in")]
    UserNotConfirmed,

    #[error("User not found")]
    UserNotFound,

    #[error("Too many failed attempts. Please try again later")]
    TooManyRequests,

    #[error("Invalid confirmation code")]
    CodeMismatch,

    #[error("Confirmation code has expired")]
    ExpiredCode,

    #[error("Too many requests. Please try again later")]
    LimitExceeded,

    #[error("New password matches a previous password")]
    PasswordHistoryPolicyViolation,

    #[error("Password reset is required")]
    PasswordResetRequired,

    #[error("Email or phone number already exists")]
    AliasExists,

    #[error("Failed to deliver verification code")]
    CodeDeliveryFailure,

    /// Sign-in needs a further step (MFA, new password, ...) this API does not drive.
    #[error("Additional authentication step required: {0}")]
    ChallengeRequired(String),

    /// Cognito answered but the response is missing required fields.
    #[error("Unexpected response from identity provider: {0}")]
    InvalidResponse(String),

    /// The request never produced a service response (network, credentials, timeout).
    #[error("Identity provider unavailable")]
    Unavailable,

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Map a Cognito error code (exception name) and message.
    pub fn from_code(code: Option<&str>, message: Option<&str>) -> Self {
        match code.unwrap_or_default() {
            "UsernameExistsException" => Self::UsernameExists,
            "InvalidPasswordException" => Self::InvalidPassword,
            "InvalidParameterException" => Self::InvalidParameter,
            "NotAuthorizedException" => Self::NotAuthorized,
            "UserNotConfirmedException" => Self::UserNotConfirmed,
            "UserNotFoundException" => Self::UserNotFound,
            "TooManyRequestsException" => Self::TooManyRequests,
            "CodeMismatchException" => Self::CodeMismatch,
            "ExpiredCodeException" => Self::ExpiredCode,
            "LimitExceededException" => Self::LimitExceeded,
            "PasswordHistoryPolicyViolationException" => Self::PasswordHistoryPolicyViolation,
            "PasswordResetRequiredException" => Self::PasswordResetRequired,
            "AliasExistsException" => Self::AliasExists,
            "CodeDeliveryFailureException" => Self::CodeDeliveryFailure,
            _ => match message.map(str::trim) {
                Some(message) if !message.is_empty() => Self::Other(message.to_string()),
                _ => Self::Other("Operation failed".to_string()),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotAuthorized | Self::UserNotFound => StatusCode::UNAUTHORIZED,
            Self::InvalidResponse(_) | Self::Unavailable => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl<E, R> From<SdkError<E, R>> for ProviderError
where
    E: ProvideErrorMetadata,
{
    fn from(err: SdkError<E, R>) -> Self {
        match err.as_service_error() {
            Some(service) => Self::from_code(service.code(), service.message()),
            None => Self::Unavailable,
        }
    }
}
