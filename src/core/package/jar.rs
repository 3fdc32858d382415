use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

use super::Package;
use crate::core::error::{JarJarError, JarJarResult};

/// A mod file on disk, read through the `zip` crate.
///
/// The archive is reopened for each read so no file handle outlives a call.
#[derive(Debug, Clone)]
pub struct JarPackage {
    path: PathBuf,
    file_name: String,
}

impl JarPackage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { path, file_name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> JarJarResult<ZipArchive<File>> {
        let file = File::open(&self.path).map_err(|source| JarJarError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(ZipArchive::new(file)?)
    }
}

impl Package for JarPackage {
    fn identity(&self) -> &str {
        &self.file_name
    }

    fn read_resource(&self, path: &str) -> JarJarResult<Option<Vec<u8>>> {
        let mut archive = self.open()?;
        let entry_name = path.trim_start_matches('/');

        let mut entry = match archive.by_name(entry_name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                trace!("{} has no resource {}", self.file_name, entry_name);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // The declared size is untrusted; let the buffer grow with the data.
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|source| JarJarError::Io {
            path: self.path.join(entry_name),
            source,
        })?;
        Ok(Some(bytes))
    }
}

/// Expand the given paths into jar packages.
///
/// Files are taken as-is; directories contribute their `.jar` files
/// (non-recursive), sorted by file name so runs are reproducible.
pub fn discover_jars(paths: &[PathBuf]) -> JarJarResult<Vec<JarPackage>> {
    let mut packages = Vec::new();

    for path in paths {
        let metadata = std::fs::metadata(path).map_err(|source| JarJarError::Io {
            path: path.clone(),
            source,
        })?;

        if !metadata.is_dir() {
            packages.push(JarPackage::new(path));
            continue;
        }

        let mut jars = Vec::new();
        let entries = std::fs::read_dir(path).map_err(|source| JarJarError::Io {
            path: path.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| JarJarError::Io {
                path: path.clone(),
                source,
            })?;
            let candidate = entry.path();
            let is_jar = candidate
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("jar"))
                .unwrap_or(false);
            if is_jar && candidate.is_file() {
                jars.push(candidate);
            }
        }
        jars.sort();
        debug!("Found {} jars in {:?}", jars.len(), path);
        packages.extend(jars.into_iter().map(JarPackage::new));
    }

    Ok(packages)
}
