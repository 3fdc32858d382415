use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::cache::{DigestAlgorithm, DEFAULT_CACHE_NAMESPACE};
use crate::core::catalog::DEFAULT_MANIFEST_PATH;
use crate::core::error::{JarJarError, JarJarResult};
use crate::core::locator::IncompatibleFileReporting;
use crate::core::resolver::SelectionPolicy;

const APP_DIR_NAME: &str = "jarjar";
const SETTINGS_FILE: &str = "settings.json";

/// Resolver settings, persisted as JSON. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Resource inside each package that lists its embedded jars.
    pub manifest_path: String,
    /// Directory under the cache root holding extracted jars.
    pub cache_namespace: String,
    pub digest: DigestAlgorithm,
    pub selection: SelectionPolicy,
    /// Policy handed to the pipeline with every resolved jar.
    pub reporting: IncompatibleFileReporting,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            digest: DigestAlgorithm::default(),
            selection: SelectionPolicy::default(),
            reporting: IncompatibleFileReporting::default(),
        }
    }
}

impl ResolverSettings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> JarJarResult<Self> {
        if !path.exists() {
            debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| JarJarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: ResolverSettings =
            serde_json::from_str(&raw).map_err(|e| JarJarError::Settings {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        settings.validate(path)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> JarJarResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| JarJarError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| JarJarError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self, path: &Path) -> JarJarResult<()> {
        let invalid = |reason: &str| JarJarError::Settings {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.manifest_path.trim().is_empty() {
            return Err(invalid("manifest_path must not be empty"));
        }
        let ns = self.cache_namespace.as_str();
        if ns.is_empty() || ns == "." || ns == ".." || ns.contains(['/', '\\']) {
            return Err(invalid("cache_namespace must be a single directory name"));
        }
        Ok(())
    }
}

/// Default cache root: `<user cache dir>/jarjar`.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Default settings file: `<user config dir>/jarjar/settings.json`.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(SETTINGS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = ResolverSettings::load(&temp.path().join("nope.json")).unwrap();
        assert_eq!(settings, ResolverSettings::default());
        assert_eq!(settings.manifest_path, "META-INF/jarjar/metadata.json");
        assert_eq!(settings.cache_namespace, "embedded_artifacts");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"digest":"sha256","selection":"oldest"}"#).unwrap();

        let settings = ResolverSettings::load(&path).unwrap();
        assert_eq!(settings.digest, DigestAlgorithm::Sha256);
        assert_eq!(settings.selection, SelectionPolicy::Oldest);
        assert_eq!(settings.reporting, IncompatibleFileReporting::Error);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("settings.json");
        let settings = ResolverSettings {
            reporting: IncompatibleFileReporting::WarnAlways,
            ..Default::default()
        };

        settings.save(&path).unwrap();
        assert_eq!(ResolverSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn malformed_or_invalid_settings_are_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");

        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            ResolverSettings::load(&path),
            Err(JarJarError::Settings { .. })
        ));

        std::fs::write(&path, r#"{"cache_namespace":"../escape"}"#).unwrap();
        assert!(matches!(
            ResolverSettings::load(&path),
            Err(JarJarError::Settings { .. })
        ));
    }
}
