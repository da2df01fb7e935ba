// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints backed by the Cognito user pool.
//!
//! Registration, sign-in and password reset are public. Password change and
//! profile endpoints are guarded and forward the caller's access token to
//! Cognito, so they require [`AccessAuth`].

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::auth::AccessAuth;
use crate::error::ApiError;
use crate::models::{
    mask_email, ChangePasswordRequest, CodeDeliveryResponse, ConfirmForgotPasswordRequest,
    ConfirmSignUpRequest, ForgotPasswordRequest, GetProfileResponse, MessageResponse,
    ResendConfirmationRequest, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
    UpdateProfileRequest, UpdateProfileResponse,
};
use crate::state::AppState;

/// Register a new user.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Authentication",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created", body = SignUpResponse),
        (status = 400, description = "Invalid input or user already exists"),
        (status = 502, description = "Identity provider unavailable"),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let request = request.validate()?;
    let user = state
        .user_pool
        .sign_up(&request.email, &request.password, &request.attributes())
        .await?;

    info!(email = %mask_email(&request.email), user_sub = %user.user_sub, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "Authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Authenticated", body = SignInResponse),
        (status = 400, description = "Invalid input, unconfirmed user or challenge required"),
        (status = 401, description = "Incorrect email or password"),
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let request = request.validate()?;
    let token = state
        .user_pool
        .sign_in(&request.email, &request.password)
        .await?;

    info!(email = %mask_email(&request.email), "user signed in");

    Ok(Json(SignInResponse {
        message: "Authentication successful".to_string(),
        token,
    }))
}

/// Confirm registration with the emailed code.
#[utoipa::path(
    post,
    path = "/auth/confirm-signup",
    tag = "Authentication",
    request_body = ConfirmSignUpRequest,
    responses(
        (status = 200, description = "User confirmed", body = MessageResponse),
        (status = 400, description = "Invalid or expired code"),
    )
)]
pub async fn confirm_sign_up(
    State(state): State<AppState>,
    Json(request): Json<ConfirmSignUpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = request.validate()?;
    state
        .user_pool
        .confirm_sign_up(&request.email, &request.code)
        .await?;

    info!(email = %mask_email(&request.email), "user confirmed");
    Ok(Json(MessageResponse::new("User confirmed successfully")))
}

/// Send a password reset code.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code sent", body = CodeDeliveryResponse),
        (status = 400, description = "Invalid input or rate limited"),
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<CodeDeliveryResponse>, ApiError> {
    let request = request.validate()?;
    let code_delivery = state.user_pool.forgot_password(&request.email).await?;

    info!(email = %mask_email(&request.email), "password reset requested");

    Ok(Json(CodeDeliveryResponse {
        message: "Password reset code sent to your email".to_string(),
        code_delivery,
    }))
}

/// Set a new password using the reset code.
#[utoipa::path(
    post,
    path = "/auth/confirm-forgot-password",
    tag = "Authentication",
    request_body = ConfirmForgotPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid code or password"),
    )
)]
pub async fn confirm_forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ConfirmForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = request.validate()?;
    state
        .user_pool
        .confirm_forgot_password(&request.email, &request.code, &request.new_password)
        .await?;

    info!(email = %mask_email(&request.email), "password reset");
    Ok(Json(MessageResponse::new("Password successfully reset")))
}

/// Resend the sign-up confirmation code.
#[utoipa::path(
    post,
    path = "/auth/resend-confirmation",
    tag = "Authentication",
    request_body = ResendConfirmationRequest,
    responses(
        (status = 200, description = "Code resent", body = CodeDeliveryResponse),
        (status = 400, description = "Invalid input or rate limited"),
    )
)]
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(request): Json<ResendConfirmationRequest>,
) -> Result<Json<CodeDeliveryResponse>, ApiError> {
    let request = request.validate()?;
    let code_delivery = state
        .user_pool
        .resend_confirmation_code(&request.email)
        .await?;

    Ok(Json(CodeDeliveryResponse {
        message: "Confirmation code resent to your email".to_string(),
        code_delivery,
    }))
}

/// Change the caller's password.
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "Authentication",
    security(("bearer" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid input or password policy violation"),
        (status = 401, description = "Missing/invalid token, ID token used, or wrong current password"),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    AccessAuth(auth): AccessAuth,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = request.validate()?;
    state
        .user_pool
        .change_password(
            auth.raw_token.as_str(),
            &request.current_password,
            &request.new_password,
        )
        .await?;

    info!(user_id = %auth.user_id(), "password changed");
    Ok(Json(MessageResponse::new("Password successfully changed")))
}

/// Update the caller's profile attributes.
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "Authentication",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 400, description = "Invalid or empty update"),
        (status = 401, description = "Missing/invalid token or ID token used"),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AccessAuth(auth): AccessAuth,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let request = request.validate()?;
    let attributes = request.attributes();
    let code_deliveries = state
        .user_pool
        .update_user_attributes(auth.raw_token.as_str(), &attributes)
        .await?;

    info!(
        user_id = %auth.user_id(),
        attributes = ?attributes.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        "profile updated"
    );

    Ok(Json(UpdateProfileResponse {
        message: "Profile successfully updated".to_string(),
        code_deliveries,
    }))
}

/// Fetch the caller's profile from the user pool.
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Authentication",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = GetProfileResponse),
        (status = 401, description = "Missing/invalid token or ID token used"),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AccessAuth(auth): AccessAuth,
) -> Result<Json<GetProfileResponse>, ApiError> {
    let user = state.user_pool.get_user(auth.raw_token.as_str()).await?;

    Ok(Json(GetProfileResponse {
        message: "Profile retrieved successfully".to_string(),
        user,
    }))
}
