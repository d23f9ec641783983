// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use webook_server::{
    api::router,
    config::{AppConfig, AuthMode, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
};

/// How often expired legacy sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Grace period for in-flight requests on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not up yet; the format itself comes from config.
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    let state = match AppState::new(config.auth.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to initialize auth");
            std::process::exit(1);
        }
    };

    if config.auth.mode == AuthMode::Session {
        let sessions = state.sessions.clone();
        let clock = state.clock.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let purged = sessions.purge_expired(clock.now()).await;
                if purged > 0 {
                    tracing::debug!(purged, "swept expired sessions");
                }
            }
        });
    }

    let app = router(state, &config.cors_origins);

    let addr: SocketAddr = match config.bind_address().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(address = %config.bind_address(), error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received, draining connections");
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    info!(
        %addr,
        auth_mode = %config.auth.mode,
        exempt_paths = ?config.auth.exempt_paths,
        "Webook server listening (docs at /docs)"
    );

    if let Err(e) = axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
