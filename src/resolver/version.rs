//! Patch-policy version matching.
//!
//! Shared frameworks are versioned per `major.minor` line. A request never
//! leaves its line; `apply_patches` decides whether a newer patch of the
//! same line may stand in for the requested one.

use semver::Version;

use crate::resolver::ResolveError;

/// Parse a version string, allowing for incomplete versions.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => {
            let major: u64 = parts[0].parse().ok()?;
            Some(Version::new(major, 0, 0))
        }
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            Some(Version::new(major, minor, 0))
        }
        _ => None,
    }
}

/// Whether `candidate` may satisfy `requested` under the patch policy.
pub fn satisfies(candidate: &Version, requested: &Version, apply_patches: bool) -> bool {
    if candidate.major != requested.major || candidate.minor != requested.minor {
        return false;
    }

    if !apply_patches {
        return candidate == requested;
    }

    // A release request never rolls onto a pre-release.
    if requested.pre.is_empty() && !candidate.pre.is_empty() {
        return false;
    }

    candidate >= requested
}

/// Choose the best version of `dependency` from `available`.
///
/// Returns the matching entry exactly as it appears in `available`.
pub fn find_matching_version(
    dependency: &str,
    requested: &str,
    available: &[String],
    apply_patches: bool,
) -> Result<String, ResolveError> {
    let wanted = parse_version_lenient(requested).ok_or_else(|| ResolveError::InvalidVersion {
        dependency: dependency.to_string(),
        version: requested.to_string(),
    })?;

    let mut parsed: Vec<(Version, &String)> = available
        .iter()
        .filter_map(|raw| parse_version_lenient(raw).map(|v| (v, raw)))
        .collect();
    parsed.sort_by(|a, b| a.0.cmp(&b.0));

    let best = parsed
        .iter()
        .filter(|(v, _)| satisfies(v, &wanted, apply_patches))
        .max_by(|a, b| a.0.cmp(&b.0));

    match best {
        Some((version, raw)) => {
            tracing::debug!(
                "resolved {} {} -> {} (apply_patches={})",
                dependency,
                requested,
                version,
                apply_patches
            );
            Ok((*raw).clone())
        }
        None => {
            let mut listed: Vec<String> = parsed.iter().map(|(_, raw)| (*raw).clone()).collect();
            listed.dedup();
            Err(ResolveError::NoMatchingVersion {
                dependency: dependency.to_string(),
                requested: requested.to_string(),
                apply_patches,
                available: listed,
            })
        }
    }
}
