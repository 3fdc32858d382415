mod manifest;

use std::collections::HashMap;

use tracing::{debug, error, trace, warn};

use crate::core::error::JarJarError;
use crate::core::maven::{ArtifactIdentity, ArtifactVersion, VersionRange};
use crate::core::package::{ByteSource, PackageHandle, PackageRef};

pub use manifest::{read_manifest, JarJarManifest, ManifestEntry, ManifestVersion, DEFAULT_MANIFEST_PATH};

/// An embedded jar that could satisfy its identity.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub identity: ArtifactIdentity,
    pub version: ArtifactVersion,
    pub source: ByteSource,
    /// Package whose manifest declared (and whose archive holds) the jar.
    pub origin: PackageRef,
    pub obfuscated: bool,
}

/// A version constraint one package places on an identity.
#[derive(Debug, Clone)]
pub struct Request {
    pub identity: ArtifactIdentity,
    pub range: VersionRange,
    pub requester: PackageRef,
}

#[derive(Debug, Default)]
struct CatalogEntry {
    candidates: Vec<Candidate>,
    requests: Vec<Request>,
}

/// Every candidate and request found across the top-level packages of one
/// run, grouped by identity.
///
/// Built once by [`ArtifactCatalog::collect`] and read-only afterwards.
/// Identities iterate in first-seen order, and candidates/requests keep the
/// order of the packages that declared them.
#[derive(Debug, Default)]
pub struct ArtifactCatalog {
    order: Vec<ArtifactIdentity>,
    entries: HashMap<ArtifactIdentity, CatalogEntry>,
}

impl ArtifactCatalog {
    pub fn collect(packages: &[PackageHandle], manifest_path: &str) -> Self {
        let mut catalog = Self::default();

        for package in packages {
            let manifest = match read_manifest(package.as_ref(), manifest_path) {
                Ok(Some(manifest)) => manifest,
                Ok(None) => {
                    trace!(
                        "{} does not contain dependency information ({})",
                        package.identity(),
                        manifest_path
                    );
                    continue;
                }
                Err(e @ JarJarError::ManifestParse { .. }) => {
                    warn!("Skipping embedded dependencies: {}", e);
                    continue;
                }
                Err(e) => {
                    error!(
                        "Failed to load resource {} from {}: {}",
                        manifest_path,
                        package.identity(),
                        e
                    );
                    continue;
                }
            };

            catalog.ingest(package, manifest);
        }

        debug!(
            "Catalogued {} identities from {} packages",
            catalog.order.len(),
            packages.len()
        );
        catalog
    }

    fn ingest(&mut self, package: &PackageHandle, manifest: JarJarManifest) {
        let origin = PackageRef::of(package.as_ref());

        for entry in manifest.jars {
            if let Some((path, version)) = entry.embedded() {
                let candidate = Candidate {
                    identity: entry.identifier.clone(),
                    version: version.clone(),
                    source: ByteSource::new(package.clone(), path),
                    origin: origin.clone(),
                    obfuscated: entry.is_obfuscated,
                };
                self.entry_mut(&entry.identifier).candidates.push(candidate);
            }

            if let Some(range) = entry.version.range {
                let request = Request {
                    identity: entry.identifier.clone(),
                    range,
                    requester: origin.clone(),
                };
                self.entry_mut(&entry.identifier).requests.push(request);
            }
        }
    }

    fn entry_mut(&mut self, identity: &ArtifactIdentity) -> &mut CatalogEntry {
        if !self.entries.contains_key(identity) {
            self.order.push(identity.clone());
        }
        self.entries.entry(identity.clone()).or_default()
    }

    /// All identities, in first-seen order.
    pub fn identities(&self) -> impl Iterator<Item = &ArtifactIdentity> {
        self.order.iter()
    }

    /// Identities at least one package placed a request on.
    pub fn requested_identities(&self) -> impl Iterator<Item = &ArtifactIdentity> {
        self.order.iter().filter(|id| !self.requests(id).is_empty())
    }

    pub fn candidates(&self, identity: &ArtifactIdentity) -> &[Candidate] {
        self.entries
            .get(identity)
            .map(|e| e.candidates.as_slice())
            .unwrap_or(&[])
    }

    pub fn requests(&self, identity: &ArtifactIdentity) -> &[Request] {
        self.entries
            .get(identity)
            .map(|e| e.requests.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::package::testing::{write_jar, write_jar_with_declared_size};
    use crate::core::package::{JarPackage, MemoryPackage};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn package(id: &str, manifest: &str) -> PackageHandle {
        Arc::new(
            MemoryPackage::new(id).with_resource(DEFAULT_MANIFEST_PATH, manifest.as_bytes().to_vec()),
        )
    }

    fn libx() -> ArtifactIdentity {
        ArtifactIdentity::new("com.example", "libx")
    }

    #[test]
    fn collects_candidates_and_requests_in_package_order() {
        let packages = vec![
            package(
                "p1.jar",
                r#"{"jars":[{"identifier":{"group":"com.example","artifact":"libx"},
                    "version":{"range":"[1.0,2.0)"}}]}"#,
            ),
            package(
                "p2.jar",
                r#"{"jars":[{"identifier":{"group":"com.example","artifact":"libx"},
                    "version":{"range":"[1.2,)","artifactVersion":"1.5"},
                    "path":"META-INF/jarjar/libx-1.5.jar"}]}"#,
            ),
        ];

        let catalog = ArtifactCatalog::collect(&packages, DEFAULT_MANIFEST_PATH);

        assert_eq!(catalog.len(), 1);
        let requesters: Vec<&str> = catalog
            .requests(&libx())
            .iter()
            .map(|r| r.requester.id.as_str())
            .collect();
        assert_eq!(requesters, vec!["p1.jar", "p2.jar"]);

        let candidates = catalog.candidates(&libx());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version.as_str(), "1.5");
        assert_eq!(candidates[0].origin.id, "p2.jar");
        assert_eq!(candidates[0].source.path(), "META-INF/jarjar/libx-1.5.jar");
    }

    #[test]
    fn malformed_manifest_does_not_block_other_packages() {
        let packages = vec![
            package("broken.jar", "{ this is not json"),
            Arc::new(MemoryPackage::new("plain.jar")) as PackageHandle,
            package(
                "good.jar",
                r#"{"jars":[{"identifier":{"group":"com.example","artifact":"libx"},
                    "version":{"range":"[1.0,2.0)"}}]}"#,
            ),
        ];

        let catalog = ArtifactCatalog::collect(&packages, DEFAULT_MANIFEST_PATH);

        assert_eq!(catalog.identities().collect::<Vec<_>>(), vec![&libx()]);
        assert_eq!(catalog.requests(&libx()).len(), 1);
    }

    #[test]
    fn unreadable_archives_are_skipped() {
        let temp = TempDir::new().unwrap();
        let garbage = temp.path().join("garbage.jar");
        std::fs::write(&garbage, b"\x13\x37 definitely not a zip archive").unwrap();
        let lying = temp.path().join("lying.jar");
        write_jar_with_declared_size(&lying, DEFAULT_MANIFEST_PATH, u64::MAX);
        let good = temp.path().join("good.jar");
        write_jar(
            &good,
            &[
                (
                    DEFAULT_MANIFEST_PATH,
                    &br#"{"jars":[{"identifier":{"group":"com.example","artifact":"libx"},
                        "version":{"range":"[1.0,2.0)","artifactVersion":"1.5"},
                        "path":"META-INF/jarjar/libx-1.5.jar"}]}"#[..],
                ),
                ("META-INF/jarjar/libx-1.5.jar", &b"libx"[..]),
            ],
        );
        let packages: Vec<PackageHandle> = [garbage, lying, good]
            .into_iter()
            .map(|path| Arc::new(JarPackage::new(path)) as PackageHandle)
            .collect();

        let catalog = ArtifactCatalog::collect(&packages, DEFAULT_MANIFEST_PATH);

        assert_eq!(catalog.identities().collect::<Vec<_>>(), vec![&libx()]);
        assert_eq!(catalog.requests(&libx())[0].requester.id, "good.jar");
        assert_eq!(catalog.candidates(&libx())[0].source.read().unwrap(), b"libx");
    }

    #[test]
    fn candidate_only_identities_are_not_requested() {
        let packages = vec![package(
            "p.jar",
            r#"{"jars":[
                {"identifier":{"group":"g","artifact":"embedded-only"},
                 "version":{"artifactVersion":"1.0"},"path":"META-INF/jarjar/e.jar"},
                {"identifier":{"group":"g","artifact":"wanted"},"version":{"range":"1.0"}}
            ]}"#,
        )];

        let catalog = ArtifactCatalog::collect(&packages, DEFAULT_MANIFEST_PATH);

        let all: Vec<String> = catalog.identities().map(|i| i.to_string()).collect();
        assert_eq!(all, vec!["g:embedded-only", "g:wanted"]);
        let requested: Vec<String> = catalog.requested_identities().map(|i| i.to_string()).collect();
        assert_eq!(requested, vec!["g:wanted"]);
        assert!(catalog.candidates(&ArtifactIdentity::new("g", "unknown")).is_empty());
    }
}
