use std::collections::HashMap;

use super::{identify_package, Package};
use crate::core::error::JarJarResult;

/// A package whose resources live in memory. Useful when the host already
/// holds the mod file contents, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    id: String,
    mod_ids: Vec<String>,
    library: Option<String>,
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryPackage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_mod_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mod_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Mark this package as a plain library with the given module name.
    pub fn as_library(mut self, module: impl Into<String>) -> Self {
        self.library = Some(module.into());
        self
    }

    pub fn with_resource(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.resources.insert(path.into(), bytes);
        self
    }
}

impl Package for MemoryPackage {
    fn identity(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        identify_package(&self.id, &self.mod_ids, self.library.as_deref())
    }

    fn read_resource(&self, path: &str) -> JarJarResult<Option<Vec<u8>>> {
        Ok(self
            .resources
            .get(path.trim_start_matches('/'))
            .cloned())
    }
}
