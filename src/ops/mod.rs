//! High-level operations.
//!
//! This module contains the finalize steps invoked by the CLI.

pub mod clean;
pub mod dotnet_cli;
pub mod finalize;
pub mod install_frameworks;
pub mod launch;

pub use clean::clean_staging_area;
pub use finalize::{run, FinalizeContext, Finalized};
pub use install_frameworks::{install_frameworks, install_frameworks_for};
