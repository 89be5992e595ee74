//! Check command for the Dedicated Admin Controller
//!
//! Evaluates the live exclusion policy against a namespace name.

use anyhow::Result;
use dedicated_admin_controller::config::ControllerConfig;
use dedicated_admin_controller::controller::reconciler::{load_policy, ExclusionPolicy};
use dedicated_admin_controller::store::KubeStore;
use kube::Client;

pub async fn check_command(client: Client, config: &ControllerConfig, namespace: &str) -> Result<()> {
    let store = KubeStore::new(client);
    let source = config.policy_source();

    println!(
        "► loading policy from ConfigMap {}/{} (field '{}')",
        source.namespace, source.config_map_name, source.field
    );

    let policy = match load_policy(&store, &source).await {
        Ok(document) => ExclusionPolicy::from_document(&document, &source.field),
        Err(e) => {
            println!("⚠ failed to load policy: {e}");
            println!("  the controller fails open: no namespace is excluded while this persists");
            ExclusionPolicy::empty()
        }
    };

    if policy.is_empty() {
        println!("  no exclusion rules");
    } else {
        println!("  rules: {}", policy.rules().collect::<Vec<_>>().join(", "));
    }

    match policy.matching_rule(namespace) {
        Some(rule) => println!("✔ namespace '{namespace}' is excluded by rule '{rule}'"),
        None => println!("✗ namespace '{namespace}' is not excluded"),
    }

    Ok(())
}
