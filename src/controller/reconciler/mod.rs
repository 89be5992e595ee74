//! # Reconciler
//!
//! Core reconciliation logic for `Namespace` resources.
//!
//! The reconciler:
//! - Loads the exclusion policy ConfigMap on every pass
//! - Skips administrative namespaces matched by the policy
//! - Skips namespaces that are missing or terminating
//! - Creates the dedicated-admin RoleBindings in every other namespace
//!
//! ## Modules
//!
//! - `policy`: exclusion rule parsing and matching
//! - `config_loader`: fetching the policy ConfigMap
//! - `lifecycle`: namespace readiness gate
//! - `apply`: desired RoleBindings and their creation
//! - `reconcile`: the per-notification pass
//! - `types`: context, outcomes and errors

pub mod apply;
pub mod config_loader;
pub mod lifecycle;
pub mod policy;
pub mod reconcile;
pub mod types;

// Re-export public API
pub use apply::{apply, DesiredRoleBindings};
pub use config_loader::{load_exclusion_policy, load_policy, PolicyDocument, PolicySource};
pub use lifecycle::{should_reconcile, GateDecision, NamespacePhase, TargetNamespace};
pub use policy::{is_excluded, ExclusionPolicy};
pub use reconcile::{reconcile, reconcile_namespace};
pub use types::{
    ApplySummary, FailureMode, ItemOutcome, ItemResult, ReconcileOutcome, Reconciler,
    ReconcilerError, SkipReason,
};
