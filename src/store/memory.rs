//! # In-Memory Store
//!
//! A [`ClusterStore`] holding everything in process memory.
//!
//! Creates are serialized by an internal mutex, mirroring how the API server
//! arbitrates concurrent creates of the same object. Failures can be injected
//! per RoleBinding name or for whole read paths.

use super::{ClusterStore, StoreError};
use crate::controller::reconciler::{NamespacePhase, PolicyDocument, TargetNamespace};
use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::RoleBinding;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    policy_documents: HashMap<(String, String), PolicyDocument>,
    namespaces: HashMap<String, TargetNamespace>,
    role_bindings: BTreeMap<(String, String), RoleBinding>,
    create_attempts: usize,
    create_failures: HashMap<String, String>,
    policy_read_failure: Option<String>,
    namespace_read_failure: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a policy document under `namespace/name`
    pub fn put_policy_document(&self, namespace: &str, name: &str, document: PolicyDocument) {
        self.state()
            .policy_documents
            .insert((namespace.to_string(), name.to_string()), document);
    }

    /// Add or replace a namespace
    pub fn put_namespace(&self, name: &str, phase: NamespacePhase) {
        self.state().namespaces.insert(
            name.to_string(),
            TargetNamespace {
                name: name.to_string(),
                phase,
            },
        );
    }

    /// Make every create of the RoleBinding called `binding_name` fail with `message`
    pub fn fail_creates_of(&self, binding_name: &str, message: &str) {
        self.state()
            .create_failures
            .insert(binding_name.to_string(), message.to_string());
    }

    /// Make every policy document read fail with `message`
    pub fn fail_policy_reads(&self, message: &str) {
        self.state().policy_read_failure = Some(message.to_string());
    }

    /// Make every namespace read fail with `message`
    pub fn fail_namespace_reads(&self, message: &str) {
        self.state().namespace_read_failure = Some(message.to_string());
    }

    /// RoleBindings currently stored in `namespace`, ordered by name
    #[must_use]
    pub fn role_bindings_in(&self, namespace: &str) -> Vec<RoleBinding> {
        self.state()
            .role_bindings
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, binding)| binding.clone())
            .collect()
    }

    /// Total number of `create_role_binding` calls, successful or not
    #[must_use]
    pub fn create_attempts(&self) -> usize {
        self.state().create_attempts
    }
}

#[async_trait]
impl ClusterStore for InMemoryStore {
    async fn get_policy_document(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PolicyDocument, StoreError> {
        let state = self.state();
        if let Some(message) = &state.policy_read_failure {
            return Err(StoreError::Other(message.clone()));
        }
        state
            .policy_documents
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "ConfigMap",
                name: format!("{namespace}/{name}"),
            })
    }

    async fn get_namespace(&self, name: &str) -> Result<TargetNamespace, StoreError> {
        let state = self.state();
        if let Some(message) = &state.namespace_read_failure {
            return Err(StoreError::Other(message.clone()));
        }
        state
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "Namespace",
                name: name.to_string(),
            })
    }

    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<(), StoreError> {
        let mut state = self.state();
        state.create_attempts += 1;

        let name = binding.metadata.name.clone().unwrap_or_default();
        let Some(namespace) = binding.metadata.namespace.clone() else {
            return Err(StoreError::Other(format!(
                "RoleBinding '{name}' has no namespace"
            )));
        };
        if let Some(message) = state.create_failures.get(&name) {
            return Err(StoreError::Other(message.clone()));
        }

        let key = (namespace, name);
        if state.role_bindings.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: "RoleBinding",
                name: format!("{}/{}", key.0, key.1),
            });
        }
        state.role_bindings.insert(key, binding.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn binding(namespace: Option<&str>, name: &str) -> RoleBinding {
        RoleBinding {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: namespace.map(str::to_string),
                ..ObjectMeta::default()
            },
            ..RoleBinding::default()
        }
    }

    #[tokio::test]
    async fn test_second_create_reports_already_exists() {
        let store = InMemoryStore::new();
        let rb = binding(Some("team-a"), "admin-dedicated-admins");

        store.create_role_binding(&rb).await.unwrap();
        let err = store.create_role_binding(&rb).await.unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(store.role_bindings_in("team-a").len(), 1);
        assert_eq!(store.create_attempts(), 2);
    }

    #[tokio::test]
    async fn test_create_without_namespace_is_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .create_role_binding(&binding(None, "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Other(_)));
        assert!(store.role_bindings_in("").is_empty());
    }

    #[tokio::test]
    async fn test_missing_namespace_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get_namespace("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_policy_failure() {
        let store = InMemoryStore::new();
        store.put_policy_document("ns", "cm", PolicyDocument::default());
        store.fail_policy_reads("connection refused");

        let err = store.get_policy_document("ns", "cm").await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
