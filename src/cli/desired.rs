//! Desired command for the Dedicated Admin Controller
//!
//! Prints the RoleBindings the controller would create, without contacting the cluster.

use crate::OutputFormat;
use anyhow::{Context, Result};
use dedicated_admin_controller::controller::reconciler::DesiredRoleBindings;

pub fn desired_command(namespace: &str, output: OutputFormat) -> Result<()> {
    let bindings = DesiredRoleBindings::dedicated_admin().scoped_to(namespace);

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&bindings)
                .context("Failed to serialize RoleBindings")?;
            println!("{json}");
        }
        OutputFormat::Yaml | OutputFormat::Text => {
            for binding in &bindings {
                let yaml =
                    serde_yaml::to_string(binding).context("Failed to serialize RoleBinding")?;
                println!("---");
                print!("{yaml}");
            }
        }
    }

    Ok(())
}
