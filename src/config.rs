// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into an
//! [`AppConfig`]. Missing or malformed values are reported as a
//! [`ConfigError`] before any verifier or SDK client is constructed.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_PROVIDER` | Identity provider (only `cognito`) | `cognito` |
//! | `AWS_REGION` | Region of the Cognito user pool | Required |
//! | `COGNITO_USER_POOL_ID` | User pool ID (`{region}_xxxx`) | Required |
//! | `COGNITO_CLIENT_ID` | App client ID | Required |
//! | `COGNITO_CLIENT_SECRET` | App client secret | Optional |
//! | `COGNITO_JWKS_URL` | JWKS endpoint override | Derived from pool |
//! | `JWKS_CACHE_TTL_SECS` | JWKS cache TTL in seconds | `3600` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files, enables HTTPS | Optional |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const AUTH_PROVIDER_ENV: &str = "AUTH_PROVIDER";
pub const AWS_REGION_ENV: &str = "AWS_REGION";
pub const USER_POOL_ID_ENV: &str = "COGNITO_USER_POOL_ID";
pub const CLIENT_ID_ENV: &str = "COGNITO_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "COGNITO_CLIENT_SECRET";
pub const JWKS_URL_ENV: &str = "COGNITO_JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600;
const SUPPORTED_PROVIDER: &str = "cognito";

/// Startup configuration failure. Always fatal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("auth provider '{0}' is not supported (only 'cognito' is available)")]
    UnsupportedProvider(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Cognito user pool and app client settings.
#[derive(Clone, PartialEq, Eq)]
pub struct CognitoConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
}

impl CognitoConfig {
    /// Build a configuration for the given pool, deriving the JWKS URL.
    pub fn new(
        region: impl Into<String>,
        user_pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let region = region.into();
        let user_pool_id = user_pool_id.into();
        let client_id = client_id.into();

        if region.trim().is_empty() {
            return Err(ConfigError::Missing(AWS_REGION_ENV));
        }
        if client_id.trim().is_empty() {
            return Err(ConfigError::Missing(CLIENT_ID_ENV));
        }
        validate_user_pool_id(&region, &user_pool_id)?;

        let jwks_url = format!("{}/.well-known/jwks.json", issuer_for(&region, &user_pool_id));

        Ok(Self {
            region,
            user_pool_id,
            client_id,
            client_secret: None,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECS),
        })
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Override the JWKS endpoint. Must be HTTPS unless it points at a loopback host.
    pub fn with_jwks_url(mut self, jwks_url: impl Into<String>) -> Result<Self, ConfigError> {
        let jwks_url = jwks_url.into();
        validate_jwks_url(&jwks_url)?;
        self.jwks_url = jwks_url;
        Ok(self)
    }

    pub fn with_jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    /// Expected `iss` claim for tokens issued by this pool.
    pub fn issuer(&self) -> String {
        issuer_for(&self.region, &self.user_pool_id)
    }
}

impl std::fmt::Debug for CognitoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoConfig")
            .field("region", &self.region)
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("jwks_url", &self.jwks_url)
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .finish()
    }
}

/// Certificate and key paths for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub tls: Option<TlsPaths>,
    pub cognito: CognitoConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = get(AUTH_PROVIDER_ENV).unwrap_or_else(|| SUPPORTED_PROVIDER.to_string());
        if !provider.eq_ignore_ascii_case(SUPPORTED_PROVIDER) {
            return Err(ConfigError::UnsupportedProvider(provider));
        }

        let region = get(AWS_REGION_ENV).ok_or(ConfigError::Missing(AWS_REGION_ENV))?;
        let user_pool_id = get(USER_POOL_ID_ENV).ok_or(ConfigError::Missing(USER_POOL_ID_ENV))?;
        let client_id = get(CLIENT_ID_ENV).ok_or(ConfigError::Missing(CLIENT_ID_ENV))?;

        let mut cognito = CognitoConfig::new(region, user_pool_id, client_id)?;
        if let Some(secret) = get(CLIENT_SECRET_ENV) {
            cognito = cognito.with_client_secret(secret);
        }
        if let Some(jwks_url) = get(JWKS_URL_ENV) {
            cognito = cognito.with_jwks_url(jwks_url)?;
        }
        if let Some(ttl) = get(JWKS_CACHE_TTL_ENV) {
            let secs: u64 = ttl.parse().map_err(|_| ConfigError::Invalid {
                var: JWKS_CACHE_TTL_ENV,
                reason: format!("'{ttl}' is not a whole number of seconds"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: JWKS_CACHE_TTL_ENV,
                    reason: "must be greater than zero".to_string(),
                });
            }
            cognito = cognito.with_jwks_cache_ttl(Duration::from_secs(secs));
        }

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            var: HOST_ENV,
            reason: format!("'{host}' is not an IP address"),
        })?;
        let port = match get(PORT_ENV) {
            Some(port) => port.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                reason: format!("'{port}' is not a valid port"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            log_format,
            tls,
            cognito,
        })
    }
}

fn issuer_for(region: &str, user_pool_id: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}")
}

fn validate_user_pool_id(region: &str, user_pool_id: &str) -> Result<(), ConfigError> {
    if user_pool_id.trim().is_empty() {
        return Err(ConfigError::Missing(USER_POOL_ID_ENV));
    }
    let suffix = user_pool_id
        .strip_prefix(region)
        .and_then(|rest| rest.strip_prefix('_'));
    match suffix {
        Some(id) if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) => Ok(()),
        _ => Err(ConfigError::Invalid {
            var: USER_POOL_ID_ENV,
            reason: format!("expected '{region}_<id>', got '{user_pool_id}'"),
        }),
    }
}

fn validate_jwks_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var: JWKS_URL_ENV,
        reason: e.to_string(),
    })?;

    let loopback = match url.host() {
        Some(url::Host::Domain(d)) => d == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    };

    match url.scheme() {
        "https" => Ok(()),
        "http" if loopback => Ok(()),
        other => Err(ConfigError::Invalid {
            var: JWKS_URL_ENV,
            reason: format!("scheme '{other}' not allowed; JWKS must be fetched over HTTPS"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (AWS_REGION_ENV, "eu-west-1"),
            (USER_POOL_ID_ENV, "eu-west-1_AbC123"),
            (CLIENT_ID_ENV, "client123"),
        ]
    }

    #[test]
    fn loads_minimal_configuration_with_defaults() {
        let config = AppConfig::from_lookup(lookup(&base_vars())).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.tls.is_none());
        assert_eq!(config.cognito.client_secret, None);
        assert_eq!(config.cognito.jwks_cache_ttl, Duration::from_secs(3600));
        assert_eq!(
            config.cognito.issuer(),
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbC123"
        );
        assert_eq!(
            config.cognito.jwks_url,
            "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbC123/.well-known/jwks.json"
        );
    }

    #[test]
    fn missing_required_variable_is_reported_by_name() {
        let vars: Vec<_> = base_vars()
            .into_iter()
            .filter(|(k, _)| *k != CLIENT_ID_ENV)
            .collect();
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing(CLIENT_ID_ENV));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut vars = base_vars();
        vars[0] = (AWS_REGION_ENV, "   ");
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing(AWS_REGION_ENV));
    }

    #[test]
    fn user_pool_must_belong_to_region() {
        let mut vars = base_vars();
        vars[1] = (USER_POOL_ID_ENV, "us-east-1_AbC123");
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: USER_POOL_ID_ENV, .. }));
    }

    #[test]
    fn only_cognito_provider_is_accepted() {
        let mut vars = base_vars();
        vars.push((AUTH_PROVIDER_ENV, "supabase"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedProvider("supabase".to_string()));

        let mut vars = base_vars();
        vars.push((AUTH_PROVIDER_ENV, "Cognito"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_ok());
    }

    #[test]
    fn optional_values_are_applied() {
        let mut vars = base_vars();
        vars.extend([
            (CLIENT_SECRET_ENV, "s3cr3t"),
            (JWKS_URL_ENV, "http://127.0.0.1:9999/jwks.json"),
            (JWKS_CACHE_TTL_ENV, "60"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "3000"),
            (LOG_FORMAT_ENV, "JSON"),
            (TLS_CERT_PATH_ENV, "/certs/cert.pem"),
            (TLS_KEY_PATH_ENV, "/certs/key.pem"),
        ]);
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.cognito.client_secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.cognito.jwks_url, "http://127.0.0.1:9999/jwks.json");
        assert_eq!(config.cognito.jwks_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "/certs/cert.pem".into(),
                key: "/certs/key.pem".into(),
            })
        );
    }

    #[test]
    fn jwks_url_must_use_https_off_loopback() {
        let mut vars = base_vars();
        vars.push((JWKS_URL_ENV, "http://keys.example.com/jwks.json"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: JWKS_URL_ENV, .. }));
    }

    #[test]
    fn zero_ttl_and_bad_port_are_rejected() {
        let mut vars = base_vars();
        vars.push((JWKS_CACHE_TTL_ENV, "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { var: JWKS_CACHE_TTL_ENV, .. })
        ));

        let mut vars = base_vars();
        vars.push((PORT_ENV, "70000"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { var: PORT_ENV, .. })
        ));
    }

    #[test]
    fn tls_requires_both_paths() {
        let mut vars = base_vars();
        vars.push((TLS_CERT_PATH_ENV, "/certs/cert.pem"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing(TLS_KEY_PATH_ENV));
    }

    #[test]
    fn debug_output_redacts_client_secret() {
        let config = CognitoConfig::new("eu-west-1", "eu-west-1_AbC123", "client123")
            .unwrap()
            .with_client_secret("s3cr3t");
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cr3t"));
        assert!(printed.contains("<redacted>"));
    }
}
