//! Reconcile command for the Dedicated Admin Controller
//!
//! Runs one pass through the same engine the controller uses.

use crate::OutputFormat;
use anyhow::{Context, Result};
use dedicated_admin_controller::config::ControllerConfig;
use dedicated_admin_controller::controller::reconciler::{
    reconcile, DesiredRoleBindings, ItemResult, ReconcileOutcome, Reconciler,
};
use dedicated_admin_controller::store::KubeStore;
use kube::Client;
use std::sync::Arc;

pub async fn reconcile_command(
    client: Client,
    config: &ControllerConfig,
    namespace: &str,
    output: OutputFormat,
) -> Result<()> {
    let reconciler = Reconciler::new(
        Arc::new(KubeStore::new(client)),
        Arc::new(DesiredRoleBindings::dedicated_admin()),
        config,
    );

    if output == OutputFormat::Text {
        println!("► reconciling namespace '{namespace}'");
    }
    let outcome = reconcile(namespace, &reconciler)
        .await
        .with_context(|| format!("Reconciliation of namespace '{namespace}' failed"))?;

    match output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&outcome).context("Failed to serialize outcome")?;
            print!("{yaml}");
        }
        OutputFormat::Text => print_outcome(&outcome),
    }

    Ok(())
}

fn print_outcome(outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::SkippedExcluded => {
            println!("✔ skipped: namespace is excluded by policy");
        }
        ReconcileOutcome::SkippedNotReady(reason) => {
            println!("✔ skipped: namespace not ready ({})", reason.as_str());
        }
        ReconcileOutcome::Applied(summary) => {
            for item in &summary.outcomes {
                match &item.result {
                    ItemResult::Created => println!("✔ {} created", item.name),
                    ItemResult::AlreadyPresent => println!("✔ {} already present", item.name),
                    ItemResult::Failed(message) => println!("✗ {} failed: {message}", item.name),
                }
            }
            println!(
                "  created={} already_present={} failed={}",
                summary.created(),
                summary.already_present(),
                summary.failed()
            );
        }
    }
}
