//! # Runtime
//!
//! Process bootstrap and the watch glue that feeds the reconciler.
//!
//! - `initialization`: rustls, tracing, metrics, HTTP server, Kubernetes client
//! - `watch_loop`: kube-runtime controller over all namespaces
//! - `error_policy`: requeue on failed passes, watch stream error handling

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use initialization::{initialize, InitializationResult};
pub use watch_loop::run_watch_loop;
