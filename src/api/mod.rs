// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, TokenKind, UserIdentity},
    cognito::{AuthTokens, CodeDelivery, SignUpResult, UserProfile},
    models::{
        ChangePasswordRequest, CodeDeliveryResponse, ConfirmForgotPasswordRequest,
        ConfirmSignUpRequest, ForgotPasswordRequest, GetProfileResponse, MessageResponse,
        ResendConfirmationRequest, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
        UpdateProfileRequest, UpdateProfileResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/confirm-signup", post(auth::confirm_sign_up))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route(
            "/auth/confirm-forgot-password",
            post(auth::confirm_forgot_password),
        )
        .route("/auth/resend-confirmation", post(auth::resend_confirmation));

    let guarded_routes = Router::new()
        .route("/auth/change-password", post(auth::change_password))
        .route(
            "/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/auth/me", get(users::me))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .merge(guarded_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Cognito ID or access token"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::sign_up,
        auth::sign_in,
        auth::confirm_sign_up,
        auth::forgot_password,
        auth::confirm_forgot_password,
        auth::resend_confirmation,
        auth::change_password,
        auth::update_profile,
        auth::get_profile,
        users::me,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SignUpRequest,
            SignUpResponse,
            SignInRequest,
            SignInResponse,
            ConfirmSignUpRequest,
            ForgotPasswordRequest,
            ConfirmForgotPasswordRequest,
            ResendConfirmationRequest,
            ChangePasswordRequest,
            UpdateProfileRequest,
            UpdateProfileResponse,
            GetProfileResponse,
            MessageResponse,
            CodeDeliveryResponse,
            CodeDelivery,
            SignUpResult,
            AuthTokens,
            UserProfile,
            UserIdentity,
            TokenKind,
            users::MeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Cognito sign-up, sign-in, passwords and profile"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
