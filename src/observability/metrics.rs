//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `dedicated_admin_reconciliations_total` - Total number of reconciliation passes
//! - `dedicated_admin_reconciliation_errors_total` - Passes that ended in an error
//! - `dedicated_admin_reconciliation_duration_seconds` - Duration of reconciliation passes
//! - `dedicated_admin_namespaces_excluded_total` - Passes skipped by the exclusion policy
//! - `dedicated_admin_namespaces_skipped_total{reason}` - Passes skipped by the lifecycle gate
//! - `dedicated_admin_policy_load_errors_total` - Failed reads of the policy ConfigMap
//! - `dedicated_admin_rolebinding_operations_total{outcome}` - RoleBinding create attempts
//! - `dedicated_admin_requeues_total{reason}` - Requeues scheduled by the error policy

use anyhow::Result;
use prometheus::{core::Collector, Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "dedicated_admin_reconciliations_total",
        "Total number of reconciliation passes",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "dedicated_admin_reconciliation_errors_total",
        "Total number of reconciliation passes that ended in an error",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "dedicated_admin_reconciliation_duration_seconds",
            "Duration of reconciliation passes in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static NAMESPACES_EXCLUDED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "dedicated_admin_namespaces_excluded_total",
        "Total number of passes skipped because the namespace matched the exclusion policy",
    )
    .expect("Failed to create NAMESPACES_EXCLUDED_TOTAL metric - this should never happen")
});

static NAMESPACES_SKIPPED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "dedicated_admin_namespaces_skipped_total",
            "Total number of passes skipped because the namespace was missing or terminating",
        ),
        &["reason"],
    )
    .expect("Failed to create NAMESPACES_SKIPPED_TOTAL metric - this should never happen")
});

static POLICY_LOAD_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "dedicated_admin_policy_load_errors_total",
        "Total number of failed exclusion policy reads",
    )
    .expect("Failed to create POLICY_LOAD_ERRORS_TOTAL metric - this should never happen")
});

static ROLEBINDING_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "dedicated_admin_rolebinding_operations_total",
            "Total number of RoleBinding create attempts by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create ROLEBINDING_OPERATIONS_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "dedicated_admin_requeues_total",
            "Total number of requeues by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register every collector with the controller registry
///
/// Safe to call more than once; already registered collectors are skipped.
#[allow(
    clippy::missing_errors_doc,
    reason = "Only fails on conflicting metric descriptors"
)]
pub fn register_metrics() -> Result<()> {
    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(RECONCILIATIONS_TOTAL.clone()),
        Box::new(RECONCILIATION_ERRORS_TOTAL.clone()),
        Box::new(RECONCILIATION_DURATION.clone()),
        Box::new(NAMESPACES_EXCLUDED_TOTAL.clone()),
        Box::new(NAMESPACES_SKIPPED_TOTAL.clone()),
        Box::new(POLICY_LOAD_ERRORS_TOTAL.clone()),
        Box::new(ROLEBINDING_OPERATIONS_TOTAL.clone()),
        Box::new(REQUEUES_TOTAL.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_namespaces_excluded() {
    NAMESPACES_EXCLUDED_TOTAL.inc();
}

#[must_use]
pub fn namespaces_excluded() -> u64 {
    NAMESPACES_EXCLUDED_TOTAL.get()
}

pub fn increment_namespaces_skipped(reason: &str) {
    NAMESPACES_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
}

#[must_use]
pub fn namespaces_skipped(reason: &str) -> u64 {
    NAMESPACES_SKIPPED_TOTAL.with_label_values(&[reason]).get()
}

pub fn increment_policy_load_errors() {
    POLICY_LOAD_ERRORS_TOTAL.inc();
}

#[must_use]
pub fn policy_load_errors() -> u64 {
    POLICY_LOAD_ERRORS_TOTAL.get()
}

/// Count one RoleBinding create attempt (`created`, `already_present` or `error`)
pub fn increment_rolebinding_operations(outcome: &str) {
    ROLEBINDING_OPERATIONS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

#[must_use]
pub fn rolebinding_operations(outcome: &str) -> u64 {
    ROLEBINDING_OPERATIONS_TOTAL
        .with_label_values(&[outcome])
        .get()
}

pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

// Counters are process-global and tests run in parallel, so assertions only
// check that a counter moved at least as far as this test pushed it.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert!(RECONCILIATIONS_TOTAL.get() > before);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        assert!(RECONCILIATION_ERRORS_TOTAL.get() > before);
    }

    #[test]
    fn test_observe_reconciliation_duration() {
        let before = RECONCILIATION_DURATION.get_sample_count();
        observe_reconciliation_duration(0.25);
        assert!(RECONCILIATION_DURATION.get_sample_count() > before);
    }

    #[test]
    fn test_increment_namespaces_skipped_by_reason() {
        let before = namespaces_skipped("terminating");
        increment_namespaces_skipped("terminating");
        assert!(namespaces_skipped("terminating") > before);
    }

    #[test]
    fn test_increment_rolebinding_operations_by_outcome() {
        let before = rolebinding_operations("error");
        increment_rolebinding_operations("error");
        assert!(rolebinding_operations("error") > before);
    }

    #[test]
    fn test_increment_requeues_total() {
        let before = REQUEUES_TOTAL.with_label_values(&["error-backoff"]).get();
        increment_requeues_total("error-backoff");
        assert!(REQUEUES_TOTAL.with_label_values(&["error-backoff"]).get() > before);
    }
}
