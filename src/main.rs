// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, sync::Arc, time::Duration};

use axum_server::tls_rustls::RustlsConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use fitrelay_server::{
    api::router,
    config::Config,
    minting::HttpMinter,
    state::AppState,
    storage::{RedbUserStore, UserStore},
    telemetry::init_tracing,
};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let database_path = config.database_path();
    let store = Arc::new(RedbUserStore::open(&database_path)?);
    info!(path = %database_path.display(), "Opened user store");

    let mut state = AppState::new(store.clone()).with_cookie_secure(config.cookie_secure);
    match &config.mint {
        Some(mint) => {
            let minter = HttpMinter::new(mint.url.clone(), mint.token.clone(), mint.timeout)?;
            info!(endpoint = %mint.url, timeout_secs = mint.timeout.as_secs(), "Minting enabled");
            state = state.with_minter(Arc::new(minter));
        }
        None => warn!("MINT_SERVICE_URL not set, minting disabled"),
    }
    if !config.cookie_secure {
        warn!("COOKIE_SECURE=false, identity cookie will be sent over plain HTTP");
    }

    let app = router(state);
    let addr = config.bind_addr()?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider before any TLS operations.
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;

            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            let handle = axum_server::Handle::new();
            let on_shutdown = handle.clone();
            let token = shutdown.clone();
            tokio::spawn(async move {
                token.cancelled().await;
                on_shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
            });

            info!(%addr, "FitRelay server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "FitRelay server listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await?;
        }
    }

    store.close()?;
    info!("Shutdown complete");
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received, draining connections");
    shutdown.cancel();
}
