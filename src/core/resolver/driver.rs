use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

use super::{AggregatedResolutionFailure, ResolutionOutcome, VersionResolver};
use crate::core::cache::{CacheEntry, ContentCache};
use crate::core::catalog::{ArtifactCatalog, Candidate};
use crate::core::error::JarJarResult;
use crate::core::maven::{ArtifactIdentity, ArtifactVersion};
use crate::core::package::PackageRef;

/// A selected embedded jar, extracted into the content cache.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedArtifact {
    pub identity: ArtifactIdentity,
    pub version: ArtifactVersion,
    /// Package the bytes were extracted from.
    pub origin: PackageRef,
    /// Path of the jar inside `origin`.
    pub embedded_path: String,
    pub cache: CacheEntry,
}

impl ResolvedArtifact {
    pub fn path(&self) -> &Path {
        &self.cache.path
    }
}

#[derive(Debug)]
pub enum DriverResult {
    /// No package requested any embedded dependency.
    NothingRequested,
    Resolved(Vec<ResolvedArtifact>),
}

impl DriverResult {
    pub fn into_artifacts(self) -> Vec<ResolvedArtifact> {
        match self {
            DriverResult::NothingRequested => Vec::new(),
            DriverResult::Resolved(artifacts) => artifacts,
        }
    }
}

/// Runs the resolver over a catalog and materializes the winners.
pub struct ResolutionDriver<'a> {
    resolver: VersionResolver,
    cache: &'a ContentCache,
}

impl<'a> ResolutionDriver<'a> {
    pub fn new(resolver: VersionResolver, cache: &'a ContentCache) -> Self {
        Self { resolver, cache }
    }

    /// Resolve every requested identity, then extract the winners.
    ///
    /// All or nothing: if any identity is infeasible nothing is extracted
    /// and the error lists every infeasible identity. An I/O failure while
    /// extracting aborts the run at once.
    pub fn run(&self, catalog: &ArtifactCatalog) -> JarJarResult<DriverResult> {
        let mut selected = Vec::new();
        let mut failures = Vec::new();

        for identity in catalog.identities() {
            let outcome = self.resolver.resolve(
                identity,
                catalog.candidates(identity),
                catalog.requests(identity),
            );
            match outcome {
                None => {}
                Some(ResolutionOutcome::Selected(candidate)) => selected.push(candidate),
                Some(ResolutionOutcome::Infeasible(failure)) => failures.push(failure),
            }
        }

        if selected.is_empty() && failures.is_empty() {
            info!("No dependencies to load found. Skipping!");
            return Ok(DriverResult::NothingRequested);
        }

        if !failures.is_empty() {
            error!(
                "{} of {} requested embedded dependencies could not be resolved",
                failures.len(),
                failures.len() + selected.len()
            );
            return Err(AggregatedResolutionFailure::new(failures).into());
        }

        let artifacts = selected
            .into_iter()
            .map(|candidate| self.materialize(candidate))
            .collect::<JarJarResult<Vec<_>>>()?;

        info!(
            "Found {} dependencies adding them to mods collection",
            artifacts.len()
        );
        Ok(DriverResult::Resolved(artifacts))
    }

    fn materialize(&self, candidate: Candidate) -> JarJarResult<ResolvedArtifact> {
        let bytes = candidate.source.read().map_err(|e| {
            error!(
                "Failed to load mod file {} from {}",
                candidate.source.path(),
                candidate.origin
            );
            e
        })?;
        let cache = self.cache.materialize(candidate.source.file_name(), &bytes)?;

        Ok(ResolvedArtifact {
            embedded_path: candidate.source.path().to_string(),
            identity: candidate.identity,
            version: candidate.version,
            origin: candidate.origin,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{CacheStatus, DigestAlgorithm, DEFAULT_CACHE_NAMESPACE};
    use crate::core::catalog::DEFAULT_MANIFEST_PATH;
    use crate::core::error::JarJarError;
    use crate::core::package::{MemoryPackage, PackageHandle};
    use crate::core::resolver::FailureReason;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(group: &str, artifact: &str, range: Option<&str>, embedded: Option<(&str, &str)>) -> String {
        let mut version = Vec::new();
        if let Some(range) = range {
            version.push(format!(r#""range":"{}""#, range));
        }
        let path = match embedded {
            Some((v, path)) => {
                version.push(format!(r#""artifactVersion":"{}""#, v));
                format!(r#","path":"{}""#, path)
            }
            None => String::new(),
        };
        format!(
            r#"{{"identifier":{{"group":"{}","artifact":"{}"}},"version":{{{}}}{}}}"#,
            group,
            artifact,
            version.join(","),
            path
        )
    }

    fn package(id: &str, entries: &[String], jars: &[(&str, &[u8])]) -> PackageHandle {
        let manifest = format!(r#"{{"jars":[{}]}}"#, entries.join(","));
        let mut package =
            MemoryPackage::new(id).with_resource(DEFAULT_MANIFEST_PATH, manifest.into_bytes());
        for (path, bytes) in jars {
            package = package.with_resource(*path, bytes.to_vec());
        }
        Arc::new(package)
    }

    fn run(temp: &TempDir, packages: &[PackageHandle]) -> JarJarResult<DriverResult> {
        let cache = ContentCache::new(temp.path(), DEFAULT_CACHE_NAMESPACE, DigestAlgorithm::Md5);
        let catalog = ArtifactCatalog::collect(packages, DEFAULT_MANIFEST_PATH);
        ResolutionDriver::new(VersionResolver::default(), &cache).run(&catalog)
    }

    #[test]
    fn scenario_a_request_satisfied_by_another_packages_jar() {
        let temp = TempDir::new().unwrap();
        let jar = "META-INF/jarjar/libx-1.5.jar";
        let packages = vec![
            package("p1.jar", &[entry("com.example", "libx", Some("[1.0,2.0)"), None)], &[]),
            package(
                "p2.jar",
                &[entry("com.example", "libx", None, Some(("1.5", jar)))],
                &[(jar, b"libx 1.5 bytes")],
            ),
        ];

        let artifacts = run(&temp, &packages).unwrap().into_artifacts();

        assert_eq!(artifacts.len(), 1);
        let libx = &artifacts[0];
        assert_eq!(libx.identity.to_string(), "com.example:libx");
        assert_eq!(libx.version.as_str(), "1.5");
        assert_eq!(libx.origin.id, "p2.jar");
        assert_eq!(libx.cache.content_hash, DigestAlgorithm::Md5.hex_digest(b"libx 1.5 bytes"));
        assert_eq!(std::fs::read(libx.path()).unwrap(), b"libx 1.5 bytes");
    }

    #[test]
    fn failures_are_aggregated_and_nothing_is_written() {
        let temp = TempDir::new().unwrap();
        let jar = "META-INF/jarjar/ok-1.0.jar";
        let packages = vec![
            package(
                "p1.jar",
                &[
                    entry("g", "libx", Some("[1.0,2.0)"), None),
                    entry("g", "liby", Some("[1.0,2.0)"), None),
                    entry("g", "ok", Some("[1.0,)"), Some(("1.0", jar))),
                ],
                &[(jar, b"ok")],
            ),
            package("p2.jar", &[entry("g", "libx", Some("[3.0,4.0)"), None)], &[]),
        ];

        let failure = match run(&temp, &packages) {
            Err(JarJarError::Resolution(failure)) => failure,
            other => panic!("expected resolution failure, got {:?}", other),
        };

        let reasons: Vec<(String, FailureReason)> = failure
            .failures()
            .iter()
            .map(|f| (f.identity.to_string(), f.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("g:libx".to_string(), FailureReason::RangeConflict),
                ("g:liby".to_string(), FailureReason::MissingSatisfyingArtifact),
            ]
        );
        assert!(!temp.path().join(DEFAULT_CACHE_NAMESPACE).exists());
    }

    #[test]
    fn resolved_and_failed_cover_exactly_the_requested_identities() {
        let temp = TempDir::new().unwrap();
        let jar = "META-INF/jarjar/a.jar";
        let packages = vec![package(
            "p.jar",
            &[
                entry("g", "a", Some("[1,2)"), Some(("1.1", jar))),
                entry("g", "b", Some("[1,2)"), None),
                entry("g", "unrequested", None, Some(("1.0", jar))),
            ],
            &[(jar, b"a")],
        )];
        let catalog = ArtifactCatalog::collect(&packages, DEFAULT_MANIFEST_PATH);
        let requested: BTreeSet<String> =
            catalog.requested_identities().map(|i| i.to_string()).collect();

        let failed: BTreeSet<String> = match run(&temp, &packages) {
            Err(JarJarError::Resolution(f)) => {
                f.failures().iter().map(|f| f.identity.to_string()).collect()
            }
            other => panic!("unexpected {:?}", other),
        };

        assert_eq!(
            requested,
            ["g:a", "g:b"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
        );
        assert_eq!(failed, BTreeSet::from(["g:b".to_string()]));
        assert!(!failed.contains("g:unrequested"));
    }

    #[test]
    fn nothing_requested_is_its_own_result() {
        let temp = TempDir::new().unwrap();
        let jar = "META-INF/jarjar/e.jar";
        let packages = vec![package(
            "p.jar",
            &[entry("g", "embedded", None, Some(("1.0", jar)))],
            &[(jar, b"e")],
        )];

        assert!(matches!(
            run(&temp, &packages).unwrap(),
            DriverResult::NothingRequested
        ));
        assert!(matches!(run(&temp, &[]).unwrap(), DriverResult::NothingRequested));
    }

    #[test]
    fn missing_embedded_bytes_abort_the_run() {
        let temp = TempDir::new().unwrap();
        let packages = vec![package(
            "p.jar",
            &[entry("g", "a", Some("[1,2)"), Some(("1.0", "META-INF/jarjar/absent.jar")))],
            &[],
        )];

        assert!(matches!(
            run(&temp, &packages),
            Err(JarJarError::EmbeddedJarMissing { .. })
        ));
    }

    #[test]
    fn repeated_runs_reuse_cached_files() {
        let temp = TempDir::new().unwrap();
        let jar = "META-INF/jarjar/a.jar";
        let packages = vec![package(
            "p.jar",
            &[entry("g", "a", Some("[1,2)"), Some(("1.0", jar)))],
            &[(jar, b"stable")],
        )];

        let first = run(&temp, &packages).unwrap().into_artifacts();
        let second = run(&temp, &packages).unwrap().into_artifacts();

        assert_eq!(first[0].cache.status, CacheStatus::Written);
        assert_eq!(second[0].cache.status, CacheStatus::Reused);
        assert_eq!(first[0].path(), second[0].path());
    }
}
