//! Command implementations

pub mod clean;
pub mod resolve;
pub mod run;

use std::path::Path;

use anyhow::Result;

use dotnet_finalize::installer::Catalog;

/// Load the dependency catalog, or an empty one when none is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Ok(Catalog::load(path)?),
        None => {
            tracing::debug!(
                "no buildpack manifest given; only installed frameworks are candidates"
            );
            Ok(Catalog::default())
        }
    }
}
