// ─── Resolution ───
// Turns a catalog of embedded jars and version requests into one selected,
// cached jar per requested identity, or one report of everything that
// could not be satisfied.

mod driver;
mod report;
mod select;

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::core::cache::ContentCache;
use crate::core::catalog::{ArtifactCatalog, Candidate, Request};
use crate::core::error::JarJarResult;
use crate::core::maven::ArtifactIdentity;
use crate::core::package::PackageHandle;
use crate::core::settings::ResolverSettings;

pub use driver::{DriverResult, ResolutionDriver, ResolvedArtifact};
pub use report::{ConflictReport, IdentityConflict, JsonRenderer, ReportRenderer, RequesterLine, TextRenderer};
pub use select::{SelectionPolicy, VersionResolver};

/// Why an identity could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The requested ranges have no version in common.
    RangeConflict,
    /// The ranges overlap but no embedded jar falls inside the overlap.
    MissingSatisfyingArtifact,
}

impl FailureReason {
    /// Short code used in diagnostic lines.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::RangeConflict => "conflict",
            FailureReason::MissingSatisfyingArtifact => "missing",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Everything known about one identity that failed to resolve.
#[derive(Debug, Clone)]
pub struct ResolutionFailure {
    pub identity: ArtifactIdentity,
    pub reason: FailureReason,
    pub requests: Vec<Request>,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone)]
pub enum ResolutionOutcome {
    Selected(Candidate),
    Infeasible(ResolutionFailure),
}

/// Every infeasible identity of one run, in catalog order.
#[derive(Debug, Clone)]
pub struct AggregatedResolutionFailure {
    failures: Vec<ResolutionFailure>,
}

impl AggregatedResolutionFailure {
    pub fn new(failures: Vec<ResolutionFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ResolutionFailure] {
        &self.failures
    }

    pub fn report(&self) -> ConflictReport {
        ConflictReport::from_failure(self)
    }
}

impl fmt::Display for AggregatedResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Failed to resolve {} embedded dependenc{}:",
            self.failures.len(),
            if self.failures.len() == 1 { "y" } else { "ies" }
        )?;
        f.write_str(&TextRenderer.render(&self.report()))
    }
}

impl std::error::Error for AggregatedResolutionFailure {}

/// Resolve the embedded dependencies of `packages` with default settings.
///
/// Returns the selected jars, cached under
/// `<cache_root>/embedded_artifacts/<digest>/<file name>`, or
/// [`JarJarError::Resolution`](crate::core::error::JarJarError::Resolution)
/// listing every identity that could not be satisfied.
pub fn resolve_embedded_dependencies(
    packages: &[PackageHandle],
    cache_root: &Path,
) -> JarJarResult<Vec<ResolvedArtifact>> {
    resolve_with_settings(packages, cache_root, &ResolverSettings::default())
}

pub fn resolve_with_settings(
    packages: &[PackageHandle],
    cache_root: &Path,
    settings: &ResolverSettings,
) -> JarJarResult<Vec<ResolvedArtifact>> {
    let catalog = ArtifactCatalog::collect(packages, &settings.manifest_path);
    let cache = ContentCache::new(cache_root, &settings.cache_namespace, settings.digest);
    let driver = ResolutionDriver::new(VersionResolver::new(settings.selection), &cache);
    Ok(driver.run(&catalog)?.into_artifacts())
}
