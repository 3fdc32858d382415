// ─── Content Cache ───
// Content-addressed storage for embedded jars:
//   <cache_root>/<namespace>/<hex digest>/<file name>

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::Digest;
use tracing::{debug, warn};

use crate::core::error::{JarJarError, JarJarResult};

/// Directory under the cache root that holds extracted embedded jars.
pub const DEFAULT_CACHE_NAMESPACE: &str = "embedded_artifacts";

/// Digest used to address cached content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
}

fn hex_of<D: Digest>(bytes: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl DigestAlgorithm {
    /// Lowercase hex digest of `bytes`.
    pub fn hex_digest(&self, bytes: &[u8]) -> String {
        match self {
            DigestAlgorithm::Md5 => hex_of::<md5::Md5>(bytes),
            DigestAlgorithm::Sha1 => hex_of::<sha1::Sha1>(bytes),
            DigestAlgorithm::Sha256 => hex_of::<sha2::Sha256>(bytes),
        }
    }
}

/// What `materialize` had to do to produce the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Nothing was on disk; the file was written.
    Written,
    /// A file of the expected size was already there and was left alone.
    Reused,
    /// A file of the wrong size was there and was overwritten.
    Repaired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub content_hash: String,
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub status: CacheStatus,
}

/// Content-addressed store for embedded jar bytes.
///
/// The path of an entry depends only on the digest of its bytes and its file
/// name, so identical jars extracted on every launch land on the same file.
/// An existing file is trusted when its size matches; a size mismatch means
/// a partial or corrupt earlier write and the file is rewritten.
#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
    digest: DigestAlgorithm,
}

impl ContentCache {
    pub fn new(cache_root: &Path, namespace: &str, digest: DigestAlgorithm) -> Self {
        Self {
            root: cache_root.join(namespace),
            digest,
        }
    }

    /// `<cache_root>/<namespace>`; created lazily by `materialize`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    pub fn entry_path(&self, content_hash: &str, filename: &str) -> PathBuf {
        self.root.join(content_hash).join(filename)
    }

    /// Persist `bytes` under their digest, writing only if the file is absent
    /// or has the wrong size.
    pub fn materialize(&self, filename: &str, bytes: &[u8]) -> JarJarResult<CacheEntry> {
        let filename = sanitize_file_name(filename)?;
        let content_hash = self.digest.hex_digest(bytes);
        let dir = self.root.join(&content_hash);

        fs::create_dir_all(&dir).map_err(|source| JarJarError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(filename);
        let expected = bytes.len() as u64;
        let existing = fs::metadata(&path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len());

        let status = match existing {
            Some(size) if size == expected => CacheStatus::Reused,
            Some(size) => {
                warn!(
                    "Cached file {:?} has {} bytes, expected {}; rewriting",
                    path, size, expected
                );
                CacheStatus::Repaired
            }
            None => CacheStatus::Written,
        };

        if status != CacheStatus::Reused {
            write_file(&path, bytes)?;
        }
        debug!("{:?} {:?}", status, path);

        Ok(CacheEntry {
            content_hash,
            filename: filename.to_string(),
            path,
            size_bytes: expected,
            status,
        })
    }
}

/// Reduce a file name hint to its last path segment.
fn sanitize_file_name(hint: &str) -> JarJarResult<&str> {
    let name = hint.rsplit(['/', '\\']).next().unwrap_or(hint).trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(JarJarError::InvalidFileName(hint.to_string()));
    }
    Ok(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> JarJarResult<()> {
    let io_err = |source| JarJarError::Io {
        path: path.to_path_buf(),
        source,
    };
    // Scoped so the handle is closed before the path is handed out.
    {
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(bytes).map_err(io_err)?;
        file.flush().map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache(temp: &TempDir) -> ContentCache {
        ContentCache::new(temp.path(), DEFAULT_CACHE_NAMESPACE, DigestAlgorithm::Md5)
    }

    #[test]
    fn digests_match_known_vectors() {
        assert_eq!(
            DigestAlgorithm::Md5.hex_digest(b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            DigestAlgorithm::Sha1.hex_digest(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(DigestAlgorithm::Sha256.hex_digest(b"abc").len(), 64);
    }

    #[test]
    fn layout_is_namespace_hash_filename() {
        let temp = TempDir::new().unwrap();
        let entry = cache(&temp).materialize("META-INF/jarjar/libx-1.5.jar", b"abc").unwrap();

        assert_eq!(entry.filename, "libx-1.5.jar");
        assert_eq!(
            entry.path,
            temp.path()
                .join("embedded_artifacts")
                .join("900150983cd24fb0d6963f7d28e17f72")
                .join("libx-1.5.jar")
        );
        assert_eq!(entry.status, CacheStatus::Written);
        assert_eq!(entry.size_bytes, 3);
        assert_eq!(fs::read(&entry.path).unwrap(), b"abc");
    }

    #[test]
    fn second_materialize_reuses_the_file() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);

        let first = cache.materialize("lib.jar", b"same bytes").unwrap();
        let modified = fs::metadata(&first.path).unwrap().modified().unwrap();

        let second = cache.materialize("lib.jar", b"same bytes").unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(second.status, CacheStatus::Reused);
        assert_eq!(fs::metadata(&second.path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn size_mismatch_is_repaired() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);

        let first = cache.materialize("lib.jar", b"full content").unwrap();
        fs::write(&first.path, b"full").unwrap();

        let second = cache.materialize("lib.jar", b"full content").unwrap();

        assert_eq!(second.status, CacheStatus::Repaired);
        assert_eq!(fs::read(&second.path).unwrap(), b"full content");
    }

    #[test]
    fn identical_bytes_under_two_names_share_the_hash_directory() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);

        let a = cache.materialize("libz-1.0.jar", b"libz").unwrap();
        let b = cache.materialize("libz-renamed.jar", b"libz").unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(a.path.parent(), b.path.parent());
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn rejects_empty_and_dot_file_names() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);
        for bad in ["", "dir/", "..", "a\\.."] {
            assert!(matches!(
                cache.materialize(bad, b"x"),
                Err(JarJarError::InvalidFileName(_))
            ));
        }
    }

    #[test]
    fn unwritable_root_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();

        let cache = ContentCache::new(&blocker, DEFAULT_CACHE_NAMESPACE, DigestAlgorithm::Sha1);
        assert!(matches!(
            cache.materialize("lib.jar", b"x"),
            Err(JarJarError::Io { .. })
        ));
    }
}
