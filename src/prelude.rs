//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use dedicated_admin_controller::prelude::*;
//! ```

// Store seam and its implementations
pub use crate::store::{ClusterStore, InMemoryStore, KubeStore, StoreError};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    is_excluded, reconcile, ApplySummary, DesiredRoleBindings, ExclusionPolicy, FailureMode,
    ItemResult, NamespacePhase, PolicyDocument, PolicySource, ReconcileOutcome, Reconciler,
    ReconcilerError, SkipReason,
};

// Config types - for configuration management
pub use crate::config::ControllerConfig;
