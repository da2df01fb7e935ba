// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AWS SDK implementation of [`UserPool`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentityprovider::config::Region;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, CodeDeliveryDetailsType};
use aws_sdk_cognitoidentityprovider::Client;
use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use super::{
    AuthTokens, CodeDelivery, ProviderError, SignUpResult, UserAttribute, UserPool, UserProfile,
};
use crate::config::CognitoConfig;
use crate::models::mask_email;

type HmacSha256 = Hmac<Sha256>;

/// Compute Cognito's `SECRET_HASH` for an app client with a secret.
///
/// `BASE64(HMAC_SHA256(client_secret, username + client_id))`. Returns `None`
/// only if the secret cannot key the MAC, which HMAC never rejects in practice.
pub fn secret_hash(client_secret: &str, username: &str, client_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes()).ok()?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Some(Base64::encode_string(&mac.finalize().into_bytes()))
}

/// User pool client for one app client.
pub struct CognitoUserPool {
    client: Client,
    client_id: String,
    client_secret: Option<String>,
}

impl CognitoUserPool {
    /// Build an SDK client for the configured region using the default AWS
    /// credential chain.
    pub async fn from_config(config: &CognitoConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Self::new(
            Client::new(&sdk_config),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
    }

    pub fn new(client: Client, client_id: String, client_secret: Option<String>) -> Self {
        Self {
            client,
            client_id,
            client_secret,
        }
    }

    fn secret_hash_for(&self, username: &str) -> Option<String> {
        self.client_secret
            .as_deref()
            .and_then(|secret| secret_hash(secret, username, &self.client_id))
    }
}

/// Map and log an SDK failure.
fn sdk_failure<E, R>(operation: &'static str, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => debug!(
            operation,
            code = service.code().unwrap_or("unknown"),
            "Cognito rejected request"
        ),
        None => warn!(
            operation,
            error = %DisplayErrorContext(&err),
            "Cognito request failed"
        ),
    }
    ProviderError::from(err)
}

fn to_attribute_types(attributes: &[UserAttribute]) -> Result<Vec<AttributeType>, ProviderError> {
    attributes
        .iter()
        .map(|attr| {
            AttributeType::builder()
                .name(&attr.name)
                .value(&attr.value)
                .build()
                .map_err(|_| ProviderError::InvalidParameter)
        })
        .collect()
}

fn code_delivery(details: &CodeDeliveryDetailsType) -> CodeDelivery {
    CodeDelivery {
        destination: details.destination().map(str::to_string),
        delivery_medium: details.delivery_medium().map(|m| m.as_str().to_string()),
        attribute_name: details.attribute_name().map(str::to_string),
    }
}

#[async_trait]
impl UserPool for CognitoUserPool {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &[UserAttribute],
    ) -> Result<SignUpResult, ProviderError> {
        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .set_secret_hash(self.secret_hash_for(email))
            .set_user_attributes(Some(to_attribute_types(attributes)?))
            .send()
            .await
            .map_err(|e| sdk_failure("sign_up", e))?;

        debug!(email = %mask_email(email), confirmed = output.user_confirmed(), "user registered");

        Ok(SignUpResult {
            user_sub: output.user_sub().to_string(),
            user_confirmed: output.user_confirmed(),
            code_delivery: output.code_delivery_details().map(code_delivery),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, ProviderError> {
        let mut request = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password);

        if let Some(hash) = self.secret_hash_for(email) {
            request = request.auth_parameters("SECRET_HASH", hash);
        }

        let output = request
            .send()
            .await
            .map_err(|e| sdk_failure("initiate_auth", e))?;

        let Some(result) = output.authentication_result() else {
            return Err(match output.challenge_name() {
                Some(challenge) => ProviderError::ChallengeRequired(challenge.as_str().to_string()),
                None => ProviderError::InvalidResponse(
                    "no authentication result or challenge".to_string(),
                ),
            });
        };

        let (Some(id_token), Some(access_token)) = (result.id_token(), result.access_token())
        else {
            return Err(ProviderError::InvalidResponse(
                "authentication result is missing tokens".to_string(),
            ));
        };

        Ok(AuthTokens {
            id_token: id_token.to_string(),
            access_token: access_token.to_string(),
            refresh_token: result.refresh_token().map(str::to_string),
            expires_in: Some(result.expires_in()),
            token_type: result.token_type().map(str::to_string),
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderError> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .set_secret_hash(self.secret_hash_for(email))
            .send()
            .await
            .map_err(|e| sdk_failure("confirm_sign_up", e))?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<Option<CodeDelivery>, ProviderError> {
        let output = self
            .client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .set_secret_hash(self.secret_hash_for(email))
            .send()
            .await
            .map_err(|e| sdk_failure("forgot_password", e))?;

        Ok(output.code_delivery_details().map(code_delivery))
    }

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(new_password)
            .set_secret_hash(self.secret_hash_for(email))
            .send()
            .await
            .map_err(|e| sdk_failure("confirm_forgot_password", e))?;
        Ok(())
    }

    async fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> Result<Option<CodeDelivery>, ProviderError> {
        let output = self
            .client
            .resend_confirmation_code()
            .client_id(&self.client_id)
            .username(email)
            .set_secret_hash(self.secret_hash_for(email))
            .send()
            .await
            .map_err(|e| sdk_failure("resend_confirmation_code", e))?;

        Ok(output.code_delivery_details().map(code_delivery))
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .change_password()
            .access_token(access_token)
            .previous_password(current_password)
            .proposed_password(new_password)
            .send()
            .await
            .map_err(|e| sdk_failure("change_password", e))?;
        Ok(())
    }

    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: &[UserAttribute],
    ) -> Result<Vec<CodeDelivery>, ProviderError> {
        let output = self
            .client
            .update_user_attributes()
            .access_token(access_token)
            .set_user_attributes(Some(to_attribute_types(attributes)?))
            .send()
            .await
            .map_err(|e| sdk_failure("update_user_attributes", e))?;

        Ok(output
            .code_delivery_details_list()
            .iter()
            .map(code_delivery)
            .collect())
    }

    async fn get_user(&self, access_token: &str) -> Result<UserProfile, ProviderError> {
        let output = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| sdk_failure("get_user", e))?;

        Ok(UserProfile {
            username: output.username().to_string(),
            attributes: output
                .user_attributes()
                .iter()
                .filter_map(|attr| Some((attr.name().to_string(), attr.value()?.to_string())))
                .collect(),
        })
    }
}
