//! # Error Policy
//!
//! Error handling for the controller watch loop.
//! This module handles reconciliation errors and watch stream errors.

use crate::controller::reconciler::{Reconciler, ReconcilerError};
use crate::observability;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Handle a failed reconciliation pass
///
/// The whole pass is retried after the configured interval; the engine
/// itself never retries.
pub fn handle_reconciliation_error(
    obj: Arc<Namespace>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();

    error!(namespace = %name, error = %error, "Reconciliation error");
    observability::metrics::increment_reconciliation_errors();

    let delay = ctx.error_requeue_interval;
    info!(
        namespace = %name,
        "🔄 Retrying in {}s (trigger source: error-backoff)",
        delay.as_secs()
    );

    observability::metrics::increment_requeues_total("error-backoff");
    Action::requeue(delay)
}

/// Classification of a watch stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    /// 401 - RBAC revoked or token expired
    Unauthorized,
    /// 410 - resource version expired, normal during restarts
    Expired,
    /// 429 - API server throttling or storage reinitializing
    TooManyRequests,
    /// 404
    NotFound,
    Other,
}

impl WatchErrorKind {
    /// Classify a watch error from its debug rendering
    #[must_use]
    pub fn classify(error_string: &str) -> Self {
        // 404 responses can carry "WatchFailed" in the chain, so check them before 401
        let is_not_found = error_string.contains("ObjectNotFound")
            || error_string.contains("404")
            || error_string.contains("not found");
        if is_not_found {
            WatchErrorKind::NotFound
        } else if error_string.contains("401") || error_string.contains("Unauthorized") {
            WatchErrorKind::Unauthorized
        } else if error_string.contains("410")
            || error_string.contains("too old resource version")
            || error_string.contains("Expired")
            || error_string.contains("Gone")
        {
            WatchErrorKind::Expired
        } else if error_string.contains("429") || error_string.contains("TooManyRequests") {
            WatchErrorKind::TooManyRequests
        } else {
            WatchErrorKind::Other
        }
    }
}

/// Log a watch stream error; the watcher recovers on its own
pub fn handle_watch_stream_error(error_string: &str) -> WatchErrorKind {
    let kind = WatchErrorKind::classify(error_string);
    match kind {
        WatchErrorKind::Unauthorized => {
            error!("❌ Watch authentication failed (401 Unauthorized) - RBAC may have been revoked or token expired");
            error!("   Verify the controller can still list namespaces:");
            error!("      kubectl auth can-i list namespaces --as=system:serviceaccount:<namespace>:dedicated-admin-controller");
        }
        WatchErrorKind::Expired => {
            warn!("Watch resource version expired (410) - watch will restart");
        }
        WatchErrorKind::TooManyRequests => {
            warn!("API server throttling watch (429): {}", error_string);
        }
        WatchErrorKind::NotFound => {
            warn!("Resource not found (404) during watch: {}", error_string);
        }
        WatchErrorKind::Other => {
            error!("Controller stream error: {}", error_string);
        }
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::controller::reconciler::DesiredRoleBindings;
    use crate::store::{InMemoryStore, StoreError};
    use std::time::Duration;

    #[test]
    fn test_classify_watch_errors() {
        assert_eq!(
            WatchErrorKind::classify("ApiError: Unauthorized (401)"),
            WatchErrorKind::Unauthorized
        );
        assert_eq!(
            WatchErrorKind::classify("too old resource version: 123 (456)"),
            WatchErrorKind::Expired
        );
        assert_eq!(
            WatchErrorKind::classify("WatchFailed: 404 page not found"),
            WatchErrorKind::NotFound
        );
        assert_eq!(
            WatchErrorKind::classify("TooManyRequests"),
            WatchErrorKind::TooManyRequests
        );
        assert_eq!(
            WatchErrorKind::classify("connection reset by peer"),
            WatchErrorKind::Other
        );
    }

    #[test]
    fn test_reconciliation_error_requeues_after_configured_interval() {
        let config = ControllerConfig {
            reconciliation_error_requeue_secs: 42,
            ..ControllerConfig::default()
        };
        let ctx = Arc::new(Reconciler::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(DesiredRoleBindings::dedicated_admin()),
            &config,
        ));
        let error = ReconcilerError::NamespaceFetch {
            name: "team-a".to_string(),
            source: StoreError::Other("connection refused".to_string()),
        };

        let action = handle_reconciliation_error(Arc::new(Namespace::default()), &error, ctx);

        assert_eq!(action, Action::requeue(Duration::from_secs(42)));
    }
}
