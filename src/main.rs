// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};

use exam_portal_server::{
    api::router,
    auth::{PasswordHasher, SessionIssuer},
    config::ServerConfig,
    state::AppState,
    storage::{seed_demo_data, PortalDatabase},
    telemetry::init_tracing,
};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_format);

    let db_path = config.database_path();
    let db = PortalDatabase::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "Opened portal database");

    let sessions = match config.jwt_secret.as_deref() {
        Some(secret) => SessionIssuer::new(secret.as_bytes()),
        None => {
            tracing::warn!("JWT_SECRET is not set; using a random secret, sessions will not survive a restart");
            SessionIssuer::with_random_secret()?
        }
    };
    let ttl = chrono::Duration::try_hours(config.session_ttl_hours)
        .ok_or("SESSION_TTL_HOURS is out of range")?;

    let state = AppState::new(db, sessions.with_ttl(ttl))
        .with_password_hasher(PasswordHasher::new(config.password_hash_iterations)?)
        .with_verify_policy(config.verify_policy);
    tracing::info!(verify_policy = ?state.verify_policy, "Registration verify policy");

    if config.seed_demo_data {
        let db = Arc::clone(&state.db);
        let hasher = state.passwords;
        tokio::task::spawn_blocking(move || seed_demo_data(&db, &hasher)).await??;
    }

    let app = router(state);
    let addr = config.bind_addr();

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    match &config.tls {
        Some(tls) => {
            // The ring provider must be installed before any TLS configuration is built
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tracing::info!(%addr, "Exam portal listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Exam portal listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM, then start a graceful shutdown.
async fn shutdown_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
