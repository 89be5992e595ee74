//! Dedicated Admin Controller Library
//!
//! A level-triggered controller that keeps the dedicated-admin RoleBindings
//! present in every namespace not excluded by the operator's policy
//! ConfigMap.
//!
//! ## Quick Start
//!
//! ```rust
//! use dedicated_admin_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod store;
