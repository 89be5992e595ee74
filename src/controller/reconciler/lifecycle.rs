//! # Lifecycle Gate
//!
//! Decides whether a namespace is in a state where RoleBindings may be created.

use crate::controller::reconciler::types::{ReconcilerError, SkipReason};
use crate::store::StoreError;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;

/// Namespace `status.phase`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespacePhase {
    Active,
    Terminating,
    /// No phase reported yet, or one this controller does not know
    Unknown,
}

impl NamespacePhase {
    #[must_use]
    pub fn from_status(phase: Option<&str>) -> Self {
        match phase {
            Some("Active") => NamespacePhase::Active,
            Some("Terminating") => NamespacePhase::Terminating,
            _ => NamespacePhase::Unknown,
        }
    }
}

/// The namespace a pass is centered on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNamespace {
    pub name: String,
    pub phase: NamespacePhase,
}

impl From<&Namespace> for TargetNamespace {
    fn from(namespace: &Namespace) -> Self {
        let phase = namespace
            .status
            .as_ref()
            .and_then(|status| status.phase.as_deref());
        Self {
            name: namespace.name_any(),
            phase: NamespacePhase::from_status(phase),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed(TargetNamespace),
    Skip(SkipReason),
}

/// Gate a pass on the result of fetching the namespace
///
/// A missing namespace is a clean skip: it is either still being created or
/// already gone, and the watch redelivers once it settles. Any other fetch
/// error fails the pass so the dispatcher retries it with backoff.
pub fn should_reconcile(
    name: &str,
    fetched: Result<TargetNamespace, StoreError>,
) -> Result<GateDecision, ReconcilerError> {
    match fetched {
        Err(e) if e.is_not_found() => Ok(GateDecision::Skip(SkipReason::NotFound)),
        Err(source) => Err(ReconcilerError::NamespaceFetch {
            name: name.to_string(),
            source,
        }),
        Ok(namespace) if namespace.phase == NamespacePhase::Terminating => {
            Ok(GateDecision::Skip(SkipReason::Terminating))
        }
        Ok(namespace) => Ok(GateDecision::Proceed(namespace)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::NamespaceStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn target(phase: NamespacePhase) -> TargetNamespace {
        TargetNamespace {
            name: "team-a".to_string(),
            phase,
        }
    }

    #[test]
    fn test_active_proceeds() {
        let decision = should_reconcile("team-a", Ok(target(NamespacePhase::Active))).unwrap();
        assert_eq!(decision, GateDecision::Proceed(target(NamespacePhase::Active)));
    }

    #[test]
    fn test_unknown_phase_proceeds() {
        let decision = should_reconcile("team-a", Ok(target(NamespacePhase::Unknown))).unwrap();
        assert!(matches!(decision, GateDecision::Proceed(_)));
    }

    #[test]
    fn test_terminating_skips() {
        let decision =
            should_reconcile("team-a", Ok(target(NamespacePhase::Terminating))).unwrap();
        assert_eq!(decision, GateDecision::Skip(SkipReason::Terminating));
    }

    #[test]
    fn test_not_found_skips_without_error() {
        let fetched = Err(StoreError::NotFound {
            kind: "Namespace",
            name: "team-a".to_string(),
        });
        let decision = should_reconcile("team-a", fetched).unwrap();
        assert_eq!(decision, GateDecision::Skip(SkipReason::NotFound));
    }

    #[test]
    fn test_other_fetch_error_fails_pass() {
        let fetched = Err(StoreError::Other("connection refused".to_string()));
        let err = should_reconcile("team-a", fetched).unwrap_err();
        assert!(matches!(
            err,
            ReconcilerError::NamespaceFetch { ref name, .. } if name == "team-a"
        ));
    }

    #[test]
    fn test_phase_from_status() {
        assert_eq!(NamespacePhase::from_status(Some("Active")), NamespacePhase::Active);
        assert_eq!(
            NamespacePhase::from_status(Some("Terminating")),
            NamespacePhase::Terminating
        );
        assert_eq!(NamespacePhase::from_status(None), NamespacePhase::Unknown);
        assert_eq!(NamespacePhase::from_status(Some("Pending")), NamespacePhase::Unknown);
    }

    #[test]
    fn test_target_from_namespace_object() {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some("team-b".to_string()),
                ..ObjectMeta::default()
            },
            status: Some(NamespaceStatus {
                phase: Some("Terminating".to_string()),
                ..NamespaceStatus::default()
            }),
            ..Namespace::default()
        };
        let target = TargetNamespace::from(&namespace);
        assert_eq!(target.name, "team-b");
        assert_eq!(target.phase, NamespacePhase::Terminating);
    }
}
