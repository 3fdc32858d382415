// ─── Dependency Locators ───
// How resolved jars re-enter discovery. A locator inspects the packages
// found so far and hands extra files to the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::error::JarJarResult;
use crate::core::package::{PackageHandle, PackageRef};
use crate::core::resolver::resolve_with_settings;
use crate::core::settings::ResolverSettings;

/// How the pipeline should react if an added file turns out incompatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompatibleFileReporting {
    #[default]
    Error,
    WarnOnKnownIncompatibility,
    WarnAlways,
    Ignore,
}

/// Provenance attached to a file added by a locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryAttributes {
    /// Package the file was extracted from.
    pub parent: Option<PackageRef>,
    pub locator: String,
}

/// Sink for files found by locators.
pub trait DiscoveryPipeline {
    fn add_path(&mut self, path: &Path, attributes: DiscoveryAttributes, reporting: IncompatibleFileReporting);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineEntry {
    pub path: PathBuf,
    pub attributes: DiscoveryAttributes,
    pub reporting: IncompatibleFileReporting,
}

/// Pipeline that records what it is given.
#[derive(Debug, Default)]
pub struct CollectingPipeline {
    pub entries: Vec<PipelineEntry>,
}

impl DiscoveryPipeline for CollectingPipeline {
    fn add_path(&mut self, path: &Path, attributes: DiscoveryAttributes, reporting: IncompatibleFileReporting) {
        self.entries.push(PipelineEntry {
            path: path.to_path_buf(),
            attributes,
            reporting,
        });
    }
}

/// A strategy for finding extra files among already discovered packages.
/// `Display` names the locator in provenance and logs.
pub trait DependencyLocator: fmt::Display {
    fn scan_packages(&self, packages: &[PackageHandle], pipeline: &mut dyn DiscoveryPipeline) -> JarJarResult<()>;
}

/// Resolves the jars embedded in mod files and adds the selected ones.
#[derive(Debug, Clone)]
pub struct JarInJarLocator {
    cache_root: PathBuf,
    settings: ResolverSettings,
}

impl JarInJarLocator {
    pub fn new(cache_root: impl Into<PathBuf>, settings: ResolverSettings) -> Self {
        Self {
            cache_root: cache_root.into(),
            settings,
        }
    }
}

impl fmt::Display for JarInJarLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("jarinjar")
    }
}

impl DependencyLocator for JarInJarLocator {
    fn scan_packages(&self, packages: &[PackageHandle], pipeline: &mut dyn DiscoveryPipeline) -> JarJarResult<()> {
        let artifacts = resolve_with_settings(packages, &self.cache_root, &self.settings)?;
        let locator = self.to_string();

        for artifact in artifacts {
            pipeline.add_path(
                artifact.path(),
                DiscoveryAttributes {
                    parent: Some(artifact.origin.clone()),
                    locator: locator.clone(),
                },
                self.settings.reporting,
            );
        }
        Ok(())
    }
}

/// Run locators in order against the same packages. The first error stops
/// the sequence.
pub fn run_locators(
    locators: &[Box<dyn DependencyLocator>],
    packages: &[PackageHandle],
    pipeline: &mut dyn DiscoveryPipeline,
) -> JarJarResult<()> {
    for locator in locators {
        info!("Running dependency locator {}", locator);
        locator.scan_packages(packages, pipeline)?;
    }
    Ok(())
}
