// ─── Packages ───
// The narrow view of a discovered mod file this crate needs: a name for
// diagnostics and read access to the resources inside it.

mod jar;
mod memory;

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::core::error::{JarJarError, JarJarResult};

pub use jar::{discover_jars, JarPackage};
pub use memory::MemoryPackage;

#[cfg(test)]
pub(crate) use jar::testing;

/// A top-level package (mod file) already found by discovery.
pub trait Package: fmt::Debug + Send + Sync {
    /// Stable identifier, unique within one run (usually the file name).
    fn identity(&self) -> &str;

    /// Human readable name used in diagnostics.
    fn display_name(&self) -> String {
        self.identity().to_string()
    }

    /// Read a resource by its path inside the package.
    ///
    /// A missing resource is `Ok(None)`, never an error.
    fn read_resource(&self, path: &str) -> JarJarResult<Option<Vec<u8>>>;
}

/// Shared handle to a package; candidates keep one to read their bytes later.
pub type PackageHandle = Arc<dyn Package>;

/// Name a package for diagnostics: its mod ids (concatenated) when it declares any,
/// `library:<module>` for plain libraries, otherwise its file name.
pub fn identify_package(file_name: &str, mod_ids: &[String], library: Option<&str>) -> String {
    if !mod_ids.is_empty() {
        return mod_ids.concat();
    }
    match library {
        Some(module) => format!("library:{}", module),
        None => file_name.to_string(),
    }
}

/// Provenance of a request or candidate, detached from the package itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageRef {
    pub id: String,
    pub display_name: String,
}

impl PackageRef {
    pub fn of(package: &dyn Package) -> Self {
        Self {
            id: package.identity().to_string(),
            display_name: package.display_name(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Lazy accessor for an embedded jar: the package holding it and the path
/// inside that package. Nothing is read until [`ByteSource::read`].
#[derive(Clone)]
pub struct ByteSource {
    package: PackageHandle,
    path: String,
}

impl ByteSource {
    pub fn new(package: PackageHandle, path: impl Into<String>) -> Self {
        Self {
            package,
            path: path.into(),
        }
    }

    /// Path of the embedded jar inside its package.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, accepting both `/` and `\` separators.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    pub fn read(&self) -> JarJarResult<Vec<u8>> {
        self.package
            .read_resource(&self.path)?
            .ok_or_else(|| JarJarError::EmbeddedJarMissing {
                package: self.package.display_name(),
                path: self.path.clone(),
            })
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("package", &self.package.identity())
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_prefers_mod_ids() {
        let ids = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(identify_package("a.jar", &ids, Some("mod.lib")), "alphabeta");
        assert_eq!(identify_package("a.jar", &[], Some("mod.lib")), "library:mod.lib");
        assert_eq!(identify_package("a.jar", &[], None), "a.jar");
    }

    #[test]
    fn byte_source_reads_lazily_and_reports_missing_entries() {
        let package: PackageHandle = Arc::new(
            MemoryPackage::new("host.jar")
                .with_resource("META-INF/jarjar/libx-1.5.jar", b"jar bytes".to_vec()),
        );

        let present = ByteSource::new(package.clone(), "META-INF/jarjar/libx-1.5.jar");
        assert_eq!(present.file_name(), "libx-1.5.jar");
        assert_eq!(present.read().unwrap(), b"jar bytes");

        let missing = ByteSource::new(package, "META-INF\\jarjar\\gone.jar");
        assert_eq!(missing.file_name(), "gone.jar");
        assert!(matches!(
            missing.read(),
            Err(JarJarError::EmbeddedJarMissing { .. })
        ));
    }
}
