//! kube-runtime controller driving `TorrentReconciler`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use kube::runtime::controller::{self, Action, Controller};
use kube::runtime::watcher;
use kube::{Api, Client};
use qbop_config::ControllerSettings;
use qbop_controller::{Outcome, ReconcileError, TorrentReconciler};
use qbop_telemetry::{reconcile_span, record_requeue};
use qbop_torrent_core::Torrent;
use qbop_torrent_core::error::error_chain;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

/// Delay before retrying a pass that returned an error.
pub const ERROR_REQUEUE: Duration = Duration::from_secs(15);

/// Shared state handed to every reconcile invocation.
pub struct ControllerContext {
    reconciler: Arc<TorrentReconciler>,
    shutdown: CancellationToken,
}

impl ControllerContext {
    /// Bundle the reconciler with the process shutdown token.
    #[must_use]
    pub const fn new(reconciler: Arc<TorrentReconciler>, shutdown: CancellationToken) -> Self {
        Self {
            reconciler,
            shutdown,
        }
    }
}

/// Watch `Torrent` objects and reconcile them until `shutdown` fires.
pub async fn run_controller(
    client: Client,
    reconciler: Arc<TorrentReconciler>,
    settings: &ControllerSettings,
    shutdown: CancellationToken,
) {
    let api: Api<Torrent> = match settings.watch_namespace.as_deref() {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    };
    info!(
        namespace = settings.watch_namespace.as_deref().unwrap_or("*"),
        concurrency = settings.concurrency,
        "starting torrent controller"
    );

    let context = Arc::new(ControllerContext::new(reconciler, shutdown.clone()));
    Controller::new(api, watcher::Config::default())
        .with_config(controller::Config::default().concurrency(settings.concurrency))
        .graceful_shutdown_on(async move { shutdown.cancelled().await })
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => debug!(resource = %object, ?action, "reconciled"),
                Err(err) => warn!(error = %error_chain(&err), "controller error"),
            }
        })
        .await;

    info!("torrent controller stopped");
}

async fn reconcile(
    torrent: Arc<Torrent>,
    context: Arc<ControllerContext>,
) -> Result<Action, ReconcileError> {
    let id = torrent.resource_id();
    let span = reconcile_span(&id);
    let outcome = context
        .reconciler
        .reconcile(&id, &context.shutdown)
        .instrument(span.clone())
        .await?;
    record_requeue(&span, outcome.requeue_after());
    Ok(action_for(outcome))
}

fn error_policy(
    torrent: Arc<Torrent>,
    err: &ReconcileError,
    _context: Arc<ControllerContext>,
) -> Action {
    if err.is_cancelled() {
        debug!(resource = %torrent.resource_id(), "reconcile cancelled");
        return Action::await_change();
    }
    warn!(
        resource = %torrent.resource_id(),
        error = %error_chain(err),
        "reconcile failed"
    );
    Action::requeue(ERROR_REQUEUE)
}

fn action_for(outcome: Outcome) -> Action {
    outcome
        .requeue_after()
        .map_or_else(Action::await_change, Action::requeue)
}
