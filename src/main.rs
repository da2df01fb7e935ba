// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};

use cognito_auth_server::{
    api::router,
    auth::TokenResolver,
    cognito::CognitoUserPool,
    config::AppConfig,
    logging::init_tracing,
    state::AppState,
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    let resolver = match TokenResolver::new(&config.cognito) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!(error = %e, "failed to build token verifier");
            return ExitCode::FAILURE;
        }
    };

    // Warm the key cache; requests will retry if this fails.
    if let Err(e) = resolver.jwks().refresh().await {
        warn!(jwks_url = %resolver.jwks().jwks_url(), error = %e, "initial JWKS fetch failed");
    }

    let user_pool = CognitoUserPool::from_config(&config.cognito).await;
    let state = AppState::new(resolver, Arc::new(user_pool));
    let app = router(state);

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let addr = config.bind_addr;
    let served = match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                warn!("rustls crypto provider was already installed");
            }

            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(cert = %tls.cert.display(), key = %tls.key.display(), error = %e, "failed to load TLS certificate");
                    return ExitCode::FAILURE;
                }
            };

            info!(%addr, user_pool_id = %config.cognito.user_pool_id, "Cognito auth server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%addr, user_pool_id = %config.cognito.user_pool_id, "Cognito auth server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    match served {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_on_signal(handle: Handle<std::net::SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
