//! File cache with time-to-live control.
//!
//! Useful for keeping pulled device artifacts around between runs without
//! re-transferring them: a cached copy is reused while it is younger than the
//! TTL and replaced from the source once it goes stale.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache root {path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("source file {path:?} does not exist")]
    SourceMissing { path: PathBuf },

    #[error("cache io failure: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub struct FileCache {
    root: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// The root directory must already exist.
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CacheError::NotADirectory { path: root });
        }
        Ok(Self { root, ttl })
    }

    /// Ensures a file is in the cache and returns its cached path.
    ///
    /// The file is copied in when it is missing from the cache or when the
    /// cached copy is older than the TTL. A source that already lives at its
    /// cached path is returned as-is.
    pub fn cache_file(&self, source: impl AsRef<Path>) -> Result<PathBuf, CacheError> {
        let source = source.as_ref();
        if !source.exists() {
            return Err(CacheError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        let file_name = source.file_name().ok_or_else(|| CacheError::SourceMissing {
            path: source.to_path_buf(),
        })?;
        let cached = self.root.join(file_name);

        if cached.exists() && fs::canonicalize(source)? == fs::canonicalize(&cached)? {
            return Ok(cached);
        }

        if !cached.exists() || self.is_stale(&cached)? {
            fs::copy(source, &cached)?;
        }
        Ok(cached)
    }

    fn is_stale(&self, path: &Path) -> Result<bool, CacheError> {
        let modified = fs::metadata(path)?.modified()?;
        // A modification time in the future counts as fresh.
        let age = modified.elapsed().unwrap_or(Duration::ZERO);
        Ok(age > self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn root_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            FileCache::new(&missing, DAY),
            Err(CacheError::NotADirectory { .. })
        ));
    }

    #[test]
    fn source_must_exist() {
        let root = tempfile::tempdir().unwrap();
        let cache = FileCache::new(root.path(), DAY).unwrap();
        assert!(matches!(
            cache.cache_file(root.path().join("missing.bin")),
            Err(CacheError::SourceMissing { .. })
        ));
    }

    #[test]
    fn caches_and_reuses_a_fresh_copy() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let source = outside.path().join("artifact.apk");
        std::fs::write(&source, "original").unwrap();

        let cache = FileCache::new(root.path(), DAY).unwrap();
        let cached = cache.cache_file(&source).unwrap();
        assert_eq!(std::fs::read_to_string(&cached).unwrap(), "original");

        // Source changes, but the cached copy is still within its TTL.
        std::fs::write(&source, "updated").unwrap();
        let cached_again = cache.cache_file(&source).unwrap();
        assert_eq!(cached, cached_again);
        assert_eq!(std::fs::read_to_string(&cached_again).unwrap(), "original");
    }

    #[test]
    fn stale_copy_is_replaced() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let source = outside.path().join("artifact.apk");
        std::fs::write(&source, "original").unwrap();

        let cache = FileCache::new(root.path(), Duration::ZERO).unwrap();
        cache.cache_file(&source).unwrap();

        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&source, "updated").unwrap();
        let cached = cache.cache_file(&source).unwrap();
        assert_eq!(std::fs::read_to_string(&cached).unwrap(), "updated");
    }

    #[test]
    fn source_inside_cache_is_returned_untouched() {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("artifact.apk");
        std::fs::write(&source, "in place").unwrap();

        let cache = FileCache::new(root.path(), DAY).unwrap();
        let cached = cache.cache_file(&source).unwrap();
        assert_eq!(fs::canonicalize(&cached).unwrap(), fs::canonicalize(&source).unwrap());
        assert_eq!(std::fs::read_to_string(&cached).unwrap(), "in place");
    }
}
