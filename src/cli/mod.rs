//! # DACTL CLI
//!
//! Command-line interface for the Dedicated Admin Controller.
//!
//! Runs the controller's decision logic against the current kube context,
//! useful when checking why a namespace did or did not get its RoleBindings.
//!
//! ## Usage
//!
//! ```bash
//! # Is a namespace excluded by the current policy?
//! dactl check kube-system
//!
//! # Show the RoleBindings the controller manages for a namespace
//! dactl desired team-a
//!
//! # Run one reconciliation pass now, printing the outcome as JSON
//! dactl reconcile team-a --output json
//! ```
//!
//! The policy ConfigMap location is read from the same environment variables
//! as the controller (`POLICY_NAMESPACE`, `POLICY_CONFIGMAP_NAME`, `POLICY_FIELD`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dedicated_admin_controller::config::ControllerConfig;
use dedicated_admin_controller::runtime::initialization::install_crypto_provider;
use kube::Client;

mod check;
mod desired;
mod reconcile;

/// Dedicated Admin Controller CLI
#[derive(Parser)]
#[command(name = "dactl")]
#[command(about = "Dedicated Admin Controller CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a namespace is excluded by the current policy
    Check {
        /// Namespace name
        #[arg(value_name = "NAMESPACE")]
        namespace: String,
    },
    /// Print the RoleBindings the controller creates in a namespace
    Desired {
        /// Namespace name
        #[arg(value_name = "NAMESPACE")]
        namespace: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },
    /// Run a single reconciliation pass for a namespace
    Reconcile {
        /// Namespace name
        #[arg(value_name = "NAMESPACE")]
        namespace: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ControllerConfig::from_env();

    match cli.command {
        Commands::Desired { namespace, output } => desired::desired_command(&namespace, output),
        Commands::Check { namespace } => {
            let client = connect().await?;
            check::check_command(client, &config, &namespace).await
        }
        Commands::Reconcile { namespace, output } => {
            let client = connect().await?;
            reconcile::reconcile_command(client, &config, &namespace, output).await
        }
    }
}

async fn connect() -> Result<Client> {
    install_crypto_provider();
    Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Is your kubeconfig set up?")
}
