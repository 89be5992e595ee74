//! # Policy Loading
//!
//! Reads the exclusion policy ConfigMap at the start of every pass.
//!
//! Nothing is cached: an edit to the ConfigMap applies to the next
//! notification without a restart.

use crate::controller::reconciler::policy::ExclusionPolicy;
use crate::controller::reconciler::types::{FailureMode, ReconcilerError};
use crate::observability;
use crate::store::{ClusterStore, StoreError};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Key/value data of the policy ConfigMap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDocument {
    data: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for PolicyDocument {
    fn from(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }
}

impl PolicyDocument {
    #[must_use]
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// Location of the exclusion policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySource {
    pub namespace: String,
    pub config_map_name: String,
    /// Data key holding the delimited rules
    pub field: String,
}

/// Fetch the raw policy document
pub async fn load_policy(
    store: &dyn ClusterStore,
    source: &PolicySource,
) -> Result<PolicyDocument, StoreError> {
    store
        .get_policy_document(&source.namespace, &source.config_map_name)
        .await
}

/// Fetch and compile the exclusion policy for one pass
///
/// With [`FailureMode::Open`] a failed read yields an empty policy, so no
/// namespace is excluded for this pass.
pub async fn load_exclusion_policy(
    store: &dyn ClusterStore,
    source: &PolicySource,
    failure_mode: FailureMode,
) -> Result<ExclusionPolicy, ReconcilerError> {
    match load_policy(store, source).await {
        Ok(document) => {
            let policy = ExclusionPolicy::from_document(&document, &source.field);
            debug!(rules = policy.len(), "Loaded exclusion policy");
            Ok(policy)
        }
        Err(e) => {
            observability::metrics::increment_policy_load_errors();
            match failure_mode {
                FailureMode::Open => {
                    warn!(
                        configmap.namespace = %source.namespace,
                        configmap.name = %source.config_map_name,
                        error = %e,
                        "Error loading exclusion policy - continuing with no exclusions"
                    );
                    Ok(ExclusionPolicy::empty())
                }
                FailureMode::Closed => Err(ReconcilerError::PolicyLoad(e)),
            }
        }
    }
}
