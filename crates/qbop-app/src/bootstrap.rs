//! Startup sequence and shutdown signal handling.

use std::sync::Arc;

use qbop_config::{OperatorConfig, QbittorrentSettings};
use qbop_controller::TorrentReconciler;
use qbop_qbittorrent::{QbClient, QbClientOptions};
use qbop_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, init_logging};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::controller::run_controller;
use crate::error::{AppError, AppResult};
use crate::store::KubeTorrentStore;

const COMPONENT: &str = "qbittorrent-operator";

/// Load configuration, connect to qBittorrent and Kubernetes, then run the
/// controller until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error when configuration, logging, the qBittorrent login or the
/// Kubernetes client setup fails.
pub async fn run_app() -> AppResult<()> {
    let config =
        OperatorConfig::from_env().map_err(|source| AppError::config("config.from_env", source))?;

    let logging = LoggingConfig {
        level: &config.logging.level,
        format: LogFormat::resolve(config.logging.format.as_deref()),
        build_sha: option_env!("QBOP_BUILD_SHA").unwrap_or("dev"),
    };
    init_logging(&logging).map_err(|source| AppError::telemetry("telemetry.init_logging", source))?;
    let _context = GlobalContextGuard::new(COMPONENT);

    info!(
        url = %config.qbittorrent.url,
        username = %config.qbittorrent.username,
        reauthenticate = config.qbittorrent.reauthenticate,
        "starting qbittorrent operator"
    );

    let remote = connect_qbittorrent(&config.qbittorrent).await?;
    let client = kube::Client::try_default()
        .await
        .map_err(|source| AppError::kube("client.try_default", source))?;

    let store = Arc::new(KubeTorrentStore::new(client.clone()));
    let reconciler = Arc::new(TorrentReconciler::new(store, remote));

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    run_controller(client, reconciler, &config.controller, shutdown).await;
    info!("qbittorrent operator stopped");
    Ok(())
}

/// Build the qBittorrent client and log in once.
pub(crate) async fn connect_qbittorrent(settings: &QbittorrentSettings) -> AppResult<Arc<QbClient>> {
    let client = QbClient::with_options(
        settings.url.as_str(),
        QbClientOptions {
            timeout: settings.timeout,
            reauthenticate: settings.reauthenticate,
        },
    )
    .map_err(|source| AppError::remote("qbittorrent.client", source))?;

    client
        .login(&settings.username, &settings.password)
        .await
        .map_err(|source| AppError::remote("qbittorrent.login", source))?;
    info!(url = %client.base_url(), "logged in to qbittorrent");
    Ok(Arc::new(client))
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    wait_for_signal().await;
    info!("shutdown signal received");
    shutdown.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            error!(error = %err, "failed to install SIGTERM handler");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        () = wait_for_ctrl_c() => info!("received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
