//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::constants::{POLICY_LOAD_FAILURE_MODE, ROLE_BINDING_FAILURE_MODE};
use crate::controller::reconciler::apply::DesiredRoleBindings;
use crate::controller::reconciler::config_loader::PolicySource;
use crate::store::{ClusterStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Only surfaced when policy loading runs with [`FailureMode::Closed`]
    #[error("failed to load exclusion policy: {0}")]
    PolicyLoad(#[source] StoreError),
    #[error("failed to fetch namespace '{name}': {source}")]
    NamespaceFetch {
        name: String,
        #[source]
        source: StoreError,
    },
    /// Only surfaced when RoleBinding creation runs with [`FailureMode::Closed`]
    #[error("{failed} of {attempted} RoleBindings failed in namespace '{namespace}'")]
    RoleBindings {
        namespace: String,
        failed: usize,
        attempted: usize,
    },
}

/// How a pass treats failures in a step that is not on the critical path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Log and count the failure, keep going
    Open,
    /// End the pass with an error so the dispatcher requeues it
    Closed,
}

/// Why a pass stopped before touching RoleBindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The namespace does not exist (yet, or anymore)
    NotFound,
    /// The namespace is being deleted
    Terminating,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotFound => "not_found",
            SkipReason::Terminating => "terminating",
        }
    }
}

/// Result of creating a single RoleBinding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "message")]
pub enum ItemResult {
    Created,
    AlreadyPresent,
    Failed(String),
}

impl ItemResult {
    /// Label value used for the per-attempt metric
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemResult::Created => "created",
            ItemResult::AlreadyPresent => "already_present",
            ItemResult::Failed(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    /// RoleBinding name
    pub name: String,
    #[serde(flatten)]
    pub result: ItemResult,
}

/// Per-item results of one apply, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub outcomes: Vec<ItemOutcome>,
}

impl ApplySummary {
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|r| matches!(r, ItemResult::Created))
    }

    #[must_use]
    pub fn already_present(&self) -> usize {
        self.count(|r| matches!(r, ItemResult::AlreadyPresent))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, ItemResult::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&ItemResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.result)).count()
    }
}

/// Terminal state of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum ReconcileOutcome {
    SkippedExcluded,
    SkippedNotReady(SkipReason),
    Applied(ApplySummary),
}

/// Shared, read-only context handed to every pass
///
/// Nothing in here changes between passes, so concurrent passes for
/// different namespaces need no coordination.
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn ClusterStore>,
    pub desired: Arc<DesiredRoleBindings>,
    pub policy_source: PolicySource,
    pub policy_load_failure_mode: FailureMode,
    pub role_binding_failure_mode: FailureMode,
    /// Requeue after a successful pass, `None` waits for the next change
    pub resync_interval: Option<Duration>,
    /// Requeue after a failed pass
    pub error_requeue_interval: Duration,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("desired", &self.desired)
            .field("policy_source", &self.policy_source)
            .field("policy_load_failure_mode", &self.policy_load_failure_mode)
            .field("role_binding_failure_mode", &self.role_binding_failure_mode)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        store: Arc<dyn ClusterStore>,
        desired: Arc<DesiredRoleBindings>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            store,
            desired,
            policy_source: config.policy_source(),
            policy_load_failure_mode: POLICY_LOAD_FAILURE_MODE,
            role_binding_failure_mode: ROLE_BINDING_FAILURE_MODE,
            resync_interval: config.resync_interval(),
            error_requeue_interval: config.reconciliation_error_requeue_duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, result: ItemResult) -> ItemOutcome {
        ItemOutcome {
            name: name.to_string(),
            result,
        }
    }

    #[test]
    fn test_apply_summary_counts() {
        let summary = ApplySummary {
            outcomes: vec![
                outcome("a", ItemResult::Created),
                outcome("b", ItemResult::AlreadyPresent),
                outcome("c", ItemResult::Failed("forbidden".to_string())),
                outcome("d", ItemResult::Created),
            ],
        };
        assert_eq!(summary.created(), 2);
        assert_eq!(summary.already_present(), 1);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = ReconcilerError::NamespaceFetch {
            name: "team-a".to_string(),
            source: StoreError::Other("connection reset".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch namespace 'team-a': connection reset"
        );

        let err = ReconcilerError::RoleBindings {
            namespace: "team-a".to_string(),
            failed: 1,
            attempted: 2,
        };
        assert_eq!(
            err.to_string(),
            "1 of 2 RoleBindings failed in namespace 'team-a'"
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = ReconcileOutcome::Applied(ApplySummary {
            outcomes: vec![
                outcome("admin-dedicated-admins", ItemResult::Created),
                outcome("broken", ItemResult::Failed("forbidden".to_string())),
            ],
        });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({
                "outcome": "applied",
                "detail": {
                    "outcomes": [
                        { "name": "admin-dedicated-admins", "result": "created" },
                        { "name": "broken", "result": "failed", "message": "forbidden" },
                    ]
                }
            })
        );

        let skipped = ReconcileOutcome::SkippedNotReady(SkipReason::Terminating);
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            serde_json::json!({ "outcome": "skipped_not_ready", "detail": "terminating" })
        );
    }

    #[test]
    fn test_default_failure_modes_are_open() {
        assert_eq!(POLICY_LOAD_FAILURE_MODE, FailureMode::Open);
        assert_eq!(ROLE_BINDING_FAILURE_MODE, FailureMode::Open);
    }
}
