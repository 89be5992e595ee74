//! # Cluster Store
//!
//! The engine's only window onto the cluster. Every pass reads the policy
//! document and the namespace through [`ClusterStore`] and writes
//! RoleBindings back through it.
//!
//! - `kube`: the production implementation backed by the Kubernetes API
//! - `memory`: an in-process implementation used by tests and dry runs

use crate::controller::reconciler::{PolicyDocument, TargetNamespace};
use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::RoleBinding;
use thiserror::Error;

pub mod kube;
pub mod memory;

pub use self::kube::KubeStore;
pub use memory::InMemoryStore;

/// Errors returned by a [`ClusterStore`]
///
/// `NotFound` and `AlreadyExists` are split out because the engine recovers
/// from both; everything else is opaque to it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },
    #[error("Kubernetes API error: {0}")]
    Kube(#[source] ::kube::Error),
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Reads and writes performed by a reconciliation pass
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch the policy document (ConfigMap data) `namespace/name`
    async fn get_policy_document(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PolicyDocument, StoreError>;

    /// Fetch the namespace the pass is centered on
    async fn get_namespace(&self, name: &str) -> Result<TargetNamespace, StoreError>;

    /// Create a RoleBinding; `metadata.namespace` must already be set
    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<(), StoreError>;
}
