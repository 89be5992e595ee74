//! # Dedicated Admin Controller
//!
//! A Kubernetes controller that grants the `dedicated-admins` group admin
//! rights in every project namespace.
//!
//! ## Overview
//!
//! For every namespace change notification the controller:
//!
//! 1. **Loads the exclusion policy** - comma-separated regular expressions from
//!    the `dedicated-admin-operator-config` ConfigMap, re-read on every pass
//! 2. **Skips administrative namespaces** - `kube-system`, `openshift-*`, ...
//! 3. **Skips namespaces that are gone or terminating**
//! 4. **Creates the dedicated-admin RoleBindings** - existing ones are left as they are
//!
//! ## Features
//!
//! - **Fail-open policy loading**: an unreadable ConfigMap never blocks reconciliation
//! - **Per-item isolation**: one failed RoleBinding does not stop the others
//! - **Prometheus metrics**: Exposes metrics for monitoring and observability
//! - **Health probes**: HTTP endpoints for liveness and readiness checks

use anyhow::Result;
use dedicated_admin_controller::runtime::{initialize, run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(
        init.namespaces,
        init.reconciler,
        init.server_state,
        init.config,
    )
    .await
}
