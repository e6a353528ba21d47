//! Core data model.
//!
//! - Dependency identifiers and framework names
//! - Deployment classification
//! - Runtime config parsing
//! - The project accessor and staging layout

pub mod dependency;
pub mod deployment;
pub mod project;
pub mod runtime_config;
pub mod stager;

pub use dependency::DependencySpec;
pub use deployment::DeploymentType;
pub use project::{Project, ProjectAccess};
pub use runtime_config::RuntimeConfig;
pub use stager::Stager;
