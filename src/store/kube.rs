//! # Kubernetes Store
//!
//! [`ClusterStore`] backed by the Kubernetes API server.

use super::{ClusterStore, StoreError};
use crate::controller::reconciler::{PolicyDocument, TargetNamespace};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use k8s_openapi::api::rbac::v1::RoleBinding;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::debug;

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_policy_document(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PolicyDocument, StoreError> {
        let configmaps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let configmap = configmaps
            .get(name)
            .await
            .map_err(|e| classify(e, "ConfigMap", &format!("{namespace}/{name}")))?;
        Ok(PolicyDocument::from(configmap.data.unwrap_or_default()))
    }

    async fn get_namespace(&self, name: &str) -> Result<TargetNamespace, StoreError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let namespace = namespaces
            .get(name)
            .await
            .map_err(|e| classify(e, "Namespace", name))?;
        Ok(TargetNamespace::from(&namespace))
    }

    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<(), StoreError> {
        let name = binding.metadata.name.as_deref().unwrap_or_default();
        let Some(namespace) = binding.metadata.namespace.as_deref() else {
            return Err(StoreError::Other(format!(
                "RoleBinding '{name}' has no namespace"
            )));
        };

        let role_bindings: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        role_bindings
            .create(&PostParams::default(), binding)
            .await
            .map_err(|e| classify(e, "RoleBinding", &format!("{namespace}/{name}")))?;
        debug!("Created RoleBinding {}/{}", namespace, name);
        Ok(())
    }
}

/// Map API status codes the engine recovers from onto dedicated variants
fn classify(err: kube::Error, kind: &'static str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(api_err) if api_err.code == 404 => StoreError::NotFound {
            kind,
            name: name.to_string(),
        },
        kube::Error::Api(api_err) if api_err.code == 409 => StoreError::AlreadyExists {
            kind,
            name: name.to_string(),
        },
        other => StoreError::Kube(other),
    }
}
