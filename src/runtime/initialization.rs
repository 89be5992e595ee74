//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, and Kubernetes client setup.

use crate::config::ControllerConfig;
use crate::controller::reconciler::{DesiredRoleBindings, Reconciler};
use crate::controller::server::{start_server, ServerState};
use crate::observability;
use crate::store::KubeStore;
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::Api, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// API for all namespaces, the watched resource
    pub namespaces: Api<Namespace>,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
    pub config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_listening", &self.server_state.is_listening())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Install the rustls crypto provider used by the Kubernetes client
///
/// Required for rustls 0.23+ when no default provider is set via features.
/// Must run before any client is created.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }
}

/// Set up the tracing subscriber
///
/// `RUST_LOG` takes precedence; otherwise the crate logs at `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("dedicated_admin_controller={}", log_level.to_lowercase()).into()
    });
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - Tracing subscriber setup
/// - rustls crypto provider setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Reconciler setup
pub async fn initialize() -> Result<InitializationResult> {
    let config = ControllerConfig::from_env();
    init_tracing(&config.log_level);
    install_crypto_provider();

    info!("Starting Dedicated Admin Controller");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        "Exclusion policy: ConfigMap {}/{} field '{}'",
        config.policy_namespace, config.policy_configmap_name, config.policy_field
    );

    observability::metrics::register_metrics()?;

    // Start HTTP server for metrics and probes, then wait for it to bind
    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle, &config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let namespaces: Api<Namespace> = Api::all(client.clone());

    // Desired RoleBindings are fixed for the lifetime of the process
    let desired = Arc::new(DesiredRoleBindings::dedicated_admin());
    info!(
        "Desired RoleBindings ({}): {}",
        desired.len(),
        desired.names().collect::<Vec<_>>().join(", ")
    );

    let reconciler = Arc::new(Reconciler::new(
        Arc::new(KubeStore::new(client)),
        desired,
        &config,
    ));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        namespaces,
        reconciler,
        server_state,
        config,
    })
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    config: &ControllerConfig,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.server_startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.server_poll_interval_ms);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_listening() {
            info!("HTTP server is accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}
