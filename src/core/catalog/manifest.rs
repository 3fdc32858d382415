use serde::{Deserialize, Serialize};

use crate::core::error::{JarJarError, JarJarResult};
use crate::core::maven::{ArtifactIdentity, ArtifactVersion, VersionRange};
use crate::core::package::Package;

/// Where a mod file lists the jars it embeds and the ranges it needs.
pub const DEFAULT_MANIFEST_PATH: &str = "META-INF/jarjar/metadata.json";

/// The jar-in-jar metadata file.
///
/// ```json
/// { "jars": [ {
///     "identifier": { "group": "com.example", "artifact": "libx" },
///     "version": { "range": "[1.0,2.0)", "artifactVersion": "1.5" },
///     "path": "META-INF/jarjar/libx-1.5.jar",
///     "isObfuscated": false
/// } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JarJarManifest {
    #[serde(default)]
    pub jars: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub identifier: ArtifactIdentity,
    #[serde(default)]
    pub version: ManifestVersion,
    /// Path of the embedded jar inside the declaring package.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub is_obfuscated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestVersion {
    /// Range the declaring package requires. Absent: no request.
    #[serde(default)]
    pub range: Option<VersionRange>,
    /// Version of the embedded jar at `path`.
    #[serde(default)]
    pub artifact_version: Option<ArtifactVersion>,
}

impl ManifestEntry {
    /// The embedded jar this entry ships, if it ships one.
    pub fn embedded(&self) -> Option<(&str, &ArtifactVersion)> {
        match (&self.path, &self.version.artifact_version) {
            (Some(path), Some(version)) => Some((path.as_str(), version)),
            _ => None,
        }
    }
}

impl JarJarManifest {
    pub fn parse(bytes: &[u8]) -> JarJarResult<Self> {
        let manifest: JarJarManifest = serde_json::from_slice(bytes)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> JarJarResult<()> {
        for entry in &self.jars {
            let id = &entry.identifier;
            if id.group.trim().is_empty() || id.artifact.trim().is_empty() {
                return Err(JarJarError::InvalidCoordinate(id.to_string()));
            }
            if entry.path.is_some() && entry.version.artifact_version.is_none() {
                return Err(JarJarError::InvalidVersion(format!(
                    "{} embeds {:?} without an artifactVersion",
                    id,
                    entry.path.as_deref().unwrap_or_default()
                )));
            }
        }
        Ok(())
    }
}

/// Read and parse the manifest of one package.
///
/// `Ok(None)` when the package does not carry one. Any malformed content is
/// reported as [`JarJarError::ManifestParse`] naming the package.
pub fn read_manifest(package: &dyn Package, manifest_path: &str) -> JarJarResult<Option<JarJarManifest>> {
    let Some(bytes) = package.read_resource(manifest_path)? else {
        return Ok(None);
    };

    JarJarManifest::parse(&bytes)
        .map(Some)
        .map_err(|e| JarJarError::ManifestParse {
            package: package.display_name(),
            reason: e.to_string(),
        })
}
