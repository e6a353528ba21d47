//! Framework versions for apps built from source.
//!
//! Both versions are read literally from the main project file. No catalog
//! matching happens here; whatever the project declares is what gets
//! installed.

use crate::core::project::ProjectAccess;
use crate::resolver::extract::{
    extract_version, ASPNETCORE_PACKAGE_REFERENCE, RUNTIME_FRAMEWORK_VERSION,
};
use crate::resolver::{FrameworkVersions, ResolveError};

pub fn resolve_source<P>(project: &P) -> Result<FrameworkVersions, ResolveError>
where
    P: ProjectAccess + ?Sized,
{
    let main = project.main_path()?;
    let text = project.read_project_file(&main)?;

    let runtime = extract_version(&text, &RUNTIME_FRAMEWORK_VERSION, &main)?;
    let aspnetcore = extract_version(&text, &ASPNETCORE_PACKAGE_REFERENCE, &main)?;

    Ok(FrameworkVersions { aspnetcore, runtime })
}
