//! # RoleBinding Applier
//!
//! Ensures every desired RoleBinding exists in a namespace.
//!
//! Creation is the only write: an existing RoleBinding with the same name is
//! taken as already applied and left untouched. A failed create is recorded
//! and the remaining RoleBindings are still attempted, so re-running the same
//! apply is always safe.

use crate::constants::DEDICATED_ADMINS_GROUP;
use crate::controller::reconciler::types::{ApplySummary, ItemOutcome, ItemResult};
use crate::observability;
use crate::store::ClusterStore;
use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{error, info};

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// The RoleBindings every non-excluded namespace should carry
///
/// Built once at startup and shared read-only between passes. Templates carry
/// no namespace; [`DesiredRoleBindings::scoped_to`] hands out stamped copies.
#[derive(Debug, Clone)]
pub struct DesiredRoleBindings {
    templates: Vec<RoleBinding>,
}

impl DesiredRoleBindings {
    #[must_use]
    pub fn new(templates: Vec<RoleBinding>) -> Self {
        Self { templates }
    }

    /// Grants the `dedicated-admins` group project-level admin rights
    #[must_use]
    pub fn dedicated_admin() -> Self {
        Self::new(vec![
            cluster_role_binding_template(
                "dedicated-admins-project-dedicated-admins",
                "dedicated-admins-project",
                DEDICATED_ADMINS_GROUP,
            ),
            cluster_role_binding_template("admin-dedicated-admins", "admin", DEDICATED_ADMINS_GROUP),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates
            .iter()
            .map(|t| t.metadata.name.as_deref().unwrap_or_default())
    }

    /// Copies of every template bound to `namespace`, in declaration order
    #[must_use]
    pub fn scoped_to(&self, namespace: &str) -> Vec<RoleBinding> {
        self.templates
            .iter()
            .map(|template| {
                let mut binding = template.clone();
                binding.metadata.namespace = Some(namespace.to_string());
                binding
            })
            .collect()
    }
}

/// A RoleBinding granting `cluster_role` to `group`
fn cluster_role_binding_template(name: &str, cluster_role: &str, group: &str) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: cluster_role.to_string(),
        },
        subjects: Some(vec![Subject {
            api_group: Some(RBAC_API_GROUP.to_string()),
            kind: "Group".to_string(),
            name: group.to_string(),
            namespace: None,
        }]),
    }
}

/// Create each desired RoleBinding in `namespace`
pub async fn apply(
    store: &dyn ClusterStore,
    namespace: &str,
    desired: &DesiredRoleBindings,
) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for binding in desired.scoped_to(namespace) {
        let name = binding.metadata.name.clone().unwrap_or_default();
        info!(rolebinding = %name, "Assigning RoleBinding to namespace");

        let result = match store.create_role_binding(&binding).await {
            Ok(()) => ItemResult::Created,
            Err(e) if e.is_already_exists() => ItemResult::AlreadyPresent,
            Err(e) => {
                error!(rolebinding = %name, error = %e, "Error creating RoleBinding");
                ItemResult::Failed(e.to_string())
            }
        };

        observability::metrics::increment_rolebinding_operations(result.as_str());
        summary.outcomes.push(ItemOutcome { name, result });
    }

    summary
}
