//! Common test utilities for reconciliation tests
//!
//! Builds an in-memory cluster seeded with the policy ConfigMap and a
//! reconciler wired to it.

use dedicated_admin_controller::prelude::*;
use std::sync::Arc;

/// In-memory store plus a reconciler bound to it
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub reconciler: Reconciler,
    pub config: ControllerConfig,
}

impl Harness {
    /// A cluster whose policy field holds `rules`
    pub fn with_policy(rules: &str) -> Self {
        let harness = Self::without_policy();
        harness.set_policy(rules);
        harness
    }

    /// A cluster with no policy ConfigMap at all
    pub fn without_policy() -> Self {
        let config = ControllerConfig::default();
        let store = Arc::new(InMemoryStore::new());
        let reconciler = Reconciler::new(
            Arc::clone(&store) as Arc<dyn ClusterStore>,
            Arc::new(DesiredRoleBindings::dedicated_admin()),
            &config,
        );
        Self {
            store,
            reconciler,
            config,
        }
    }

    pub fn set_policy(&self, rules: &str) {
        self.store.put_policy_document(
            &self.config.policy_namespace,
            &self.config.policy_configmap_name,
            PolicyDocument::default().with_field(&self.config.policy_field, rules),
        );
    }

    pub fn active_namespace(&self, name: &str) -> &Self {
        self.store.put_namespace(name, NamespacePhase::Active);
        self
    }

    pub async fn reconcile(&self, name: &str) -> Result<ReconcileOutcome, ReconcilerError> {
        reconcile(name, &self.reconciler).await
    }
}

/// Unwrap an `Applied` outcome
pub fn applied(outcome: ReconcileOutcome) -> ApplySummary {
    match outcome {
        ReconcileOutcome::Applied(summary) => summary,
        other => panic!("expected Applied, got {other:?}"),
    }
}
