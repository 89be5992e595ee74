//! # Configuration
//!
//! Controller-level settings loaded from environment variables.
//!
//! - `controller`: [`ControllerConfig`] and the env parsing helpers

pub mod controller;

pub use controller::ControllerConfig;
