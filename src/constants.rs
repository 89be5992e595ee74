//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable (see [`crate::config`]).

use crate::controller::reconciler::FailureMode;

/// Namespace holding the controller's policy ConfigMap
pub const DEFAULT_POLICY_NAMESPACE: &str = "openshift-dedicated-admin";

/// Name of the ConfigMap holding the exclusion policy
pub const DEFAULT_POLICY_CONFIGMAP_NAME: &str = "dedicated-admin-operator-config";

/// ConfigMap data key holding the comma-separated exclusion rules
pub const DEFAULT_POLICY_FIELD: &str = "project_blacklist";

/// Delimiter between exclusion rules inside the policy field
pub const POLICY_RULE_DELIMITER: char = ',';

/// Group granted the dedicated-admin RoleBindings
pub const DEDICATED_ADMINS_GROUP: &str = "dedicated-admins";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default requeue interval for reconciliation errors (seconds)
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Default periodic resync interval (seconds), 0 disables resync
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 0;

/// Default delay before restarting watch stream after it ends or fails (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default upper bound on parallel reconciliations
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// What a pass does when the exclusion policy cannot be read.
///
/// `Open`: log, count, and continue as if no namespace were excluded.
pub const POLICY_LOAD_FAILURE_MODE: FailureMode = FailureMode::Open;

/// What a pass does when one or more RoleBinding creates fail.
///
/// `Open`: each failure is logged and counted, the pass still succeeds and
/// the remaining RoleBindings are still attempted.
pub const ROLE_BINDING_FAILURE_MODE: FailureMode = FailureMode::Open;
