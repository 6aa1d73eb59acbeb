//! Temporary output path generation.
//!
//! Every time a script is generated it is given a fresh path where the
//! headless browser writes the image. The generator is injected into
//! [`DomShot`](crate::DomShot) so tests can use predictable names.
//!
//! | Generator | Names |
//! |-----------|-------|
//! | [`RandomOutputPath`] | `<dir>/<prefix><uuid>.<ext>` (default) |
//! | [`SequentialOutputPath`] | `<dir>/<prefix><n>.<ext>` |
//!
//! Paths are only chosen here, never created. Two renders can still race
//! for the same name in theory, but with UUIDs the chance is negligible.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of temporary output paths.
///
/// # Thread Safety
///
/// Requires `Send + Sync` so a [`DomShot`](crate::DomShot) can be moved onto
/// a blocking thread by `render_async`.
pub trait OutputPathGenerator: Send + Sync {
    /// Return a new path ending in `.{extension}`.
    fn next_path(&self, extension: &str) -> PathBuf;
}

/// Random names built from a v4 UUID.
#[derive(Debug, Clone)]
pub struct RandomOutputPath {
    dir: PathBuf,
    prefix: String,
}

impl RandomOutputPath {
    /// Names under `dir` starting with `prefix`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Directory the names live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputPathGenerator for RandomOutputPath {
    fn next_path(&self, extension: &str) -> PathBuf {
        let id = Uuid::new_v4().simple();
        self.dir.join(format!("{}{}.{}", self.prefix, id, extension))
    }
}

/// Deterministic names from a monotonically increasing counter.
///
/// # Example
///
/// ```rust
/// use domshot::naming::{OutputPathGenerator, SequentialOutputPath};
///
/// let names = SequentialOutputPath::new("/tmp", "shot_");
/// assert_eq!(names.next_path("png").to_str(), Some("/tmp/shot_0.png"));
/// assert_eq!(names.next_path("png").to_str(), Some("/tmp/shot_1.png"));
/// ```
#[derive(Debug)]
pub struct SequentialOutputPath {
    dir: PathBuf,
    prefix: String,
    next: AtomicU64,
}

impl SequentialOutputPath {
    /// Names under `dir` starting with `prefix`, counting from 0.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }

    /// Number of paths handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl OutputPathGenerator for SequentialOutputPath {
    fn next_path(&self, extension: &str) -> PathBuf {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        self.dir.join(format!("{}{}.{}", self.prefix, n, extension))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_paths_are_distinct() {
        let names = RandomOutputPath::new("/tmp", "tmp_domshot_");
        let a = names.next_path("png");
        let b = names.next_path("png");

        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/tmp")));

        let file = a.file_name().unwrap().to_str().unwrap();
        assert!(file.starts_with("tmp_domshot_"), "unexpected name: {}", file);
        assert!(file.ends_with(".png"), "unexpected name: {}", file);
        // prefix + 32 hex digits + ".png"
        assert_eq!(file.len(), "tmp_domshot_".len() + 32 + 4);
    }

    #[test]
    fn test_sequential_paths() {
        let names = SequentialOutputPath::new("/scratch", "out_");
        assert_eq!(names.next_path("gif"), PathBuf::from("/scratch/out_0.gif"));
        assert_eq!(names.next_path("jpg"), PathBuf::from("/scratch/out_1.jpg"));
        assert_eq!(names.issued(), 2);
    }
}
