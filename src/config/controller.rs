//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::controller::reconciler::PolicySource;
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace of the ConfigMap holding the exclusion policy
    pub policy_namespace: String,
    /// Name of the ConfigMap holding the exclusion policy
    pub policy_configmap_name: String,
    /// Data key inside the ConfigMap holding the comma-separated rules
    pub policy_field: String,
    /// HTTP port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    /// How long to wait for the HTTP server to bind (seconds)
    pub server_startup_timeout_secs: u64,
    /// Poll interval while waiting for the HTTP server (milliseconds)
    pub server_poll_interval_ms: u64,
    /// Reconciliation error requeue interval (seconds)
    /// How long to wait before retrying a failed reconciliation
    pub reconciliation_error_requeue_secs: u64,
    /// Periodic resync of healthy namespaces (seconds), 0 waits for the next change
    pub resync_interval_secs: u64,
    /// Watch stream restart delay after errors or stream end (seconds)
    pub watch_restart_delay_secs: u64,
    /// Maximum concurrent reconciliations
    /// Limits how many namespaces can be reconciled simultaneously
    pub max_concurrent_reconciliations: u16,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            policy_namespace: DEFAULT_POLICY_NAMESPACE.to_string(),
            policy_configmap_name: DEFAULT_POLICY_CONFIGMAP_NAME.to_string(),
            policy_field: DEFAULT_POLICY_FIELD.to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
            server_startup_timeout_secs: DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            server_poll_interval_ms: DEFAULT_SERVER_POLL_INTERVAL_MS,
            reconciliation_error_requeue_secs: DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            log_level: "info".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            policy_namespace: env_var_or_default_str("POLICY_NAMESPACE", DEFAULT_POLICY_NAMESPACE),
            policy_configmap_name: env_var_or_default_str(
                "POLICY_CONFIGMAP_NAME",
                DEFAULT_POLICY_CONFIGMAP_NAME,
            ),
            policy_field: env_var_or_default_str("POLICY_FIELD", DEFAULT_POLICY_FIELD),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            server_startup_timeout_secs: env_var_or_default(
                "SERVER_STARTUP_TIMEOUT_SECS",
                DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            ),
            server_poll_interval_ms: env_var_or_default(
                "SERVER_POLL_INTERVAL_MS",
                DEFAULT_SERVER_POLL_INTERVAL_MS,
            ),
            reconciliation_error_requeue_secs: env_var_or_default(
                "RECONCILIATION_ERROR_REQUEUE_SECS",
                DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS,
            ),
            resync_interval_secs: env_var_or_default(
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            watch_restart_delay_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_SECS",
                DEFAULT_WATCH_RESTART_DELAY_SECS,
            ),
            max_concurrent_reconciliations: env_var_or_default(
                "MAX_CONCURRENT_RECONCILIATIONS",
                DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            ),
            log_level: env_var_or_default_str("LOG_LEVEL", "info"),
        }
    }

    /// Where each pass reads its exclusion policy from
    #[must_use]
    pub fn policy_source(&self) -> PolicySource {
        PolicySource {
            namespace: self.policy_namespace.clone(),
            config_map_name: self.policy_configmap_name.clone(),
            field: self.policy_field.clone(),
        }
    }

    /// Get reconciliation error requeue duration
    #[must_use]
    pub fn reconciliation_error_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.reconciliation_error_requeue_secs)
    }

    /// Resync interval, `None` when periodic resync is disabled
    #[must_use]
    pub fn resync_interval(&self) -> Option<Duration> {
        (self.resync_interval_secs > 0).then(|| Duration::from_secs(self.resync_interval_secs))
    }

    /// Get watch restart delay duration
    #[must_use]
    pub fn watch_restart_delay_duration(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_source_points_at_operator_configmap() {
        let source = ControllerConfig::default().policy_source();
        assert_eq!(source.namespace, "openshift-dedicated-admin");
        assert_eq!(source.config_map_name, "dedicated-admin-operator-config");
        assert_eq!(source.field, "project_blacklist");
    }

    #[test]
    fn test_resync_disabled_by_default() {
        assert_eq!(ControllerConfig::default().resync_interval(), None);
    }

    #[test]
    fn test_resync_enabled_when_positive() {
        let config = ControllerConfig {
            resync_interval_secs: 300,
            ..ControllerConfig::default()
        };
        assert_eq!(config.resync_interval(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_env_var_or_default_parses_value() {
        std::env::set_var("DAC_TEST_PARSE_U16", "9090");
        assert_eq!(env_var_or_default("DAC_TEST_PARSE_U16", 8080_u16), 9090);
        std::env::remove_var("DAC_TEST_PARSE_U16");
    }

    #[test]
    fn test_env_var_or_default_falls_back_on_garbage() {
        std::env::set_var("DAC_TEST_GARBAGE_U64", "soon");
        assert_eq!(env_var_or_default("DAC_TEST_GARBAGE_U64", 60_u64), 60);
        std::env::remove_var("DAC_TEST_GARBAGE_U64");
    }

    #[test]
    fn test_env_var_or_default_str_missing() {
        assert_eq!(
            env_var_or_default_str("DAC_TEST_DEFINITELY_UNSET", "fallback"),
            "fallback"
        );
    }
}
