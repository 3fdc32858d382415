use std::path::PathBuf;
use thiserror::Error;

use crate::core::resolver::AggregatedResolutionFailure;

/// Central error type for the resolver backend.
/// Every module returns `Result<T, JarJarError>`.
#[derive(Debug, Error)]
pub enum JarJarError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Embedded jar {path} is missing from {package}")]
    EmbeddedJarMissing { package: String, path: String },

    #[error("Invalid cache file name: {0:?}")]
    InvalidFileName(String),

    // ── Manifest ────────────────────────────────────────
    #[error("Malformed dependency manifest in {package}: {reason}")]
    ManifestParse { package: String, reason: String },

    #[error("Invalid artifact coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("Invalid version range {range:?}: {reason}")]
    InvalidVersionRange { range: String, reason: String },

    // ── Resolution ──────────────────────────────────────
    #[error("{0}")]
    Resolution(AggregatedResolutionFailure),

    // ── Settings ────────────────────────────────────────
    #[error("Invalid settings at {path:?}: {reason}")]
    Settings { path: PathBuf, reason: String },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Convenience alias used throughout the crate.
pub type JarJarResult<T> = Result<T, JarJarError>;

impl From<std::io::Error> for JarJarError {
    fn from(source: std::io::Error) -> Self {
        JarJarError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<AggregatedResolutionFailure> for JarJarError {
    fn from(failure: AggregatedResolutionFailure) -> Self {
        JarJarError::Resolution(failure)
    }
}

impl JarJarError {
    /// Environment failures abort a run; constraint failures are reported.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, JarJarError::Resolution(_))
    }
}
