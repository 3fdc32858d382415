use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{JarJarError, JarJarResult};

/// The `(group, artifact)` pair all embedded versions of one library share.
///
/// Two jars with the same identity compete for a single slot on the module
/// path, whatever their version.
///
/// Supported formats:
///   `groupId:artifactId`
///   `groupId:artifactId:version` (version ignored)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactIdentity {
    pub group: String,
    pub artifact: String,
}

impl ArtifactIdentity {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parse a Maven-style coordinate into its identity part.
    ///
    /// # Examples
    /// ```
    /// use jarjar_lib::core::maven::ArtifactIdentity;
    /// let id = ArtifactIdentity::parse("com.example:libx").unwrap();
    /// assert_eq!(id.group, "com.example");
    /// ```
    pub fn parse(coord: &str) -> JarJarResult<Self> {
        let parts: Vec<&str> = coord.trim().split(':').collect();

        match parts.as_slice() {
            [group, artifact] | [group, artifact, _] => {
                if group.is_empty() || artifact.is_empty() {
                    return Err(JarJarError::InvalidCoordinate(coord.to_string()));
                }
                Ok(Self::new(*group, *artifact))
            }
            _ => Err(JarJarError::InvalidCoordinate(coord.to_string())),
        }
    }
}

impl fmt::Display for ArtifactIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}
