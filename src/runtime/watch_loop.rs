//! # Watch Loop
//!
//! Controller watch loop that monitors `Namespace` resources and triggers a
//! reconciliation pass for every change notification.

use crate::config::ControllerConfig;
use crate::controller::reconciler::{reconcile_namespace, Reconciler};
use crate::controller::server::ServerState;
use crate::runtime::error_policy::{handle_reconciliation_error, handle_watch_stream_error};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::Api;
use kube_runtime::{controller, watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller watch loop
///
/// Watches every namespace and hands each notification to
/// [`reconcile_namespace`]. kube-runtime never runs two passes for the same
/// namespace at once; different namespaces run in parallel up to
/// `max_concurrent_reconciliations`. The watch is restarted if its stream
/// ends without a shutdown signal.
pub async fn run_watch_loop(
    namespaces: Api<Namespace>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
    config: ControllerConfig,
) -> Result<(), anyhow::Error> {
    // Mark the server as not ready as soon as a shutdown signal arrives
    let shutdown_server_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal, initiating graceful shutdown...");
        shutdown_server_state.begin_shutdown();
    });

    let controller_config =
        controller::Config::default().concurrency(config.max_concurrent_reconciliations);

    loop {
        if server_state.is_shutting_down() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        info!("Starting controller watch loop...");
        server_state.set_ready(true);
        Controller::new(namespaces.clone(), watcher::Config::default())
            .with_config(controller_config.clone())
            .shutdown_on_signal()
            .run(
                reconcile_namespace,
                handle_reconciliation_error,
                Arc::clone(&reconciler),
            )
            .for_each(|result| {
                match result {
                    Ok((obj_ref, _action)) => {
                        debug!(namespace = %obj_ref.name, "watch.event.reconciled");
                    }
                    Err(controller::Error::ReconcilerFailed(_, obj_ref)) => {
                        // Already logged and requeued by the error policy
                        debug!(namespace = %obj_ref.name, "watch.event.reconcile_failed");
                    }
                    Err(e) => {
                        handle_watch_stream_error(&format!("{e:?}"));
                    }
                }
                futures::future::ready(())
            })
            .await;
        server_state.set_ready(false);

        if server_state.is_shutting_down() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let delay = config.watch_restart_delay_duration();
        warn!(
            "Controller watch stream ended, restarting in {} seconds...",
            delay.as_secs()
        );
        tokio::time::sleep(delay).await;
    }

    info!("Controller stopped gracefully");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                futures::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
