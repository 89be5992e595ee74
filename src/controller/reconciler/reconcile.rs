//! # Reconciliation Logic
//!
//! One pass per namespace notification:
//!
//! 1. Load the exclusion policy (fail-open by default)
//! 2. Stop if the namespace is excluded
//! 3. Re-read the namespace and stop if it is missing or terminating
//! 4. Create the desired RoleBindings
//!
//! Passes share no mutable state. Everything is re-read from the cluster so a
//! redelivered notification always acts on current data.

use crate::controller::reconciler::apply::apply;
use crate::controller::reconciler::config_loader::load_exclusion_policy;
use crate::controller::reconciler::lifecycle::{should_reconcile, GateDecision};
use crate::controller::reconciler::types::{
    FailureMode, ReconcileOutcome, Reconciler, ReconcilerError,
};
use crate::observability;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Instrument};

/// Run one reconciliation pass for the namespace `name`
pub async fn reconcile(
    name: &str,
    ctx: &Reconciler,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let start = Instant::now();
    let span = tracing::info_span!("reconcile", namespace = name);

    let result = reconcile_pass(name, ctx).instrument(span).await;

    observability::metrics::increment_reconciliations();
    observability::metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
    result
}

async fn reconcile_pass(
    name: &str,
    ctx: &Reconciler,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let policy = load_exclusion_policy(
        ctx.store.as_ref(),
        &ctx.policy_source,
        ctx.policy_load_failure_mode,
    )
    .await?;

    // Administrative namespaces (kube-system, openshift-logging, ...) never get the bindings
    if let Some(rule) = policy.matching_rule(name) {
        info!(rule, "Excluded namespace - skipping");
        observability::metrics::increment_namespaces_excluded();
        return Ok(ReconcileOutcome::SkippedExcluded);
    }

    let fetched = ctx.store.get_namespace(name).await;
    let namespace = match should_reconcile(name, fetched)? {
        GateDecision::Proceed(namespace) => namespace,
        GateDecision::Skip(reason) => {
            info!(reason = reason.as_str(), "Namespace not ready - skipping");
            observability::metrics::increment_namespaces_skipped(reason.as_str());
            return Ok(ReconcileOutcome::SkippedNotReady(reason));
        }
    };

    let summary = apply(ctx.store.as_ref(), &namespace.name, &ctx.desired).await;
    info!(
        created = summary.created(),
        already_present = summary.already_present(),
        failed = summary.failed(),
        "Applied RoleBindings"
    );

    if summary.failed() > 0 && ctx.role_binding_failure_mode == FailureMode::Closed {
        return Err(ReconcilerError::RoleBindings {
            namespace: namespace.name,
            failed: summary.failed(),
            attempted: summary.outcomes.len(),
        });
    }

    Ok(ReconcileOutcome::Applied(summary))
}

/// Entry point wired into the kube-runtime controller
///
/// Only the name of the notified namespace is used; the pass re-reads
/// everything else.
pub async fn reconcile_namespace(
    obj: Arc<Namespace>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    reconcile(&obj.name_any(), &ctx).await?;
    Ok(ctx
        .resync_interval
        .map_or_else(Action::await_change, Action::requeue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::controller::reconciler::apply::DesiredRoleBindings;
    use crate::controller::reconciler::config_loader::PolicyDocument;
    use crate::controller::reconciler::lifecycle::NamespacePhase;
    use crate::controller::reconciler::types::SkipReason;
    use crate::store::InMemoryStore;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::time::Duration;

    fn setup(rules: &str) -> (Arc<InMemoryStore>, Reconciler) {
        let config = ControllerConfig::default();
        let store = Arc::new(InMemoryStore::new());
        store.put_policy_document(
            &config.policy_namespace,
            &config.policy_configmap_name,
            PolicyDocument::default().with_field(&config.policy_field, rules),
        );
        let reconciler = Reconciler::new(
            Arc::clone(&store) as Arc<dyn crate::store::ClusterStore>,
            Arc::new(DesiredRoleBindings::dedicated_admin()),
            &config,
        );
        (store, reconciler)
    }

    fn namespace_object(name: &str) -> Arc<Namespace> {
        Arc::new(Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        })
    }

    #[tokio::test]
    async fn test_excluded_namespace_is_not_fetched_or_applied() {
        let (store, ctx) = setup("kube-.*,openshift-.*");
        store.put_namespace("kube-system", NamespacePhase::Active);

        let outcome = reconcile("kube-system", &ctx).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::SkippedExcluded);
        assert_eq!(store.create_attempts(), 0);
    }

    #[tokio::test]
    async fn test_role_binding_failure_closed_fails_pass() {
        let (store, mut ctx) = setup("");
        ctx.role_binding_failure_mode = FailureMode::Closed;
        store.put_namespace("team-a", NamespacePhase::Active);
        store.fail_creates_of("admin-dedicated-admins", "admission webhook denied");

        let err = reconcile("team-a", &ctx).await.unwrap_err();

        assert!(matches!(
            err,
            ReconcilerError::RoleBindings { failed: 1, attempted: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_namespace_skips() {
        let (store, ctx) = setup("");

        let outcome = reconcile("ghost", &ctx).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::SkippedNotReady(SkipReason::NotFound));
        assert_eq!(store.create_attempts(), 0);
    }

    #[tokio::test]
    async fn test_adapter_waits_for_change_by_default() {
        let (store, ctx) = setup("");
        store.put_namespace("team-a", NamespacePhase::Active);

        let action = reconcile_namespace(namespace_object("team-a"), Arc::new(ctx))
            .await
            .unwrap();

        assert_eq!(action, Action::await_change());
        assert_eq!(store.role_bindings_in("team-a").len(), 2);
    }

    #[tokio::test]
    async fn test_adapter_requeues_with_resync() {
        let (store, mut ctx) = setup("");
        ctx.resync_interval = Some(Duration::from_secs(600));
        store.put_namespace("team-a", NamespacePhase::Active);

        let action = reconcile_namespace(namespace_object("team-a"), Arc::new(ctx))
            .await
            .unwrap();

        assert_eq!(action, Action::requeue(Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_adapter_propagates_fetch_error() {
        let (store, ctx) = setup("");
        store.fail_namespace_reads("connection refused");

        let result = reconcile_namespace(namespace_object("team-a"), Arc::new(ctx)).await;

        assert!(matches!(result, Err(ReconcilerError::NamespaceFetch { .. })));
    }
}
