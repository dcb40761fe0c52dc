//! Filesystem existence probes.
//!
//! Template resolution only ever asks one question of the filesystem: does
//! this path exist? [`FileProbe`] isolates that question so resolution logic
//! can be tested against an in-memory tree, and so tests can count exactly
//! which paths were consulted.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Answers existence questions for template resolution.
pub trait FileProbe {
    /// Returns true if `path` exists (file or directory).
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FileProbe for DiskProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory probe over a fixed set of paths.
///
/// Directories are implied: adding `a/b/c.php` makes `a`, `a/b` and
/// `a/b/c.php` all exist. Every call is recorded so tests can assert which
/// paths the resolver consulted.
///
/// # Example
///
/// ```rust
/// use almanac_render::{FileProbe, MemoryProbe};
/// use std::path::Path;
///
/// let probe = MemoryProbe::new(["plugin/src/views/list.php"]);
/// assert!(probe.exists(Path::new("plugin/src/views")));
/// assert!(!probe.exists(Path::new("theme/tribe-events")));
/// assert_eq!(probe.calls().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemoryProbe {
    entries: BTreeSet<PathBuf>,
    calls: RefCell<Vec<PathBuf>>,
}

impl MemoryProbe {
    /// Creates a probe that reports the given files (and their parents) as existing.
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut probe = Self::default();
        for file in files {
            probe.insert(file);
        }
        probe
    }

    /// Adds a file and all of its ancestors.
    pub fn insert(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        for ancestor in file.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.entries.insert(ancestor.to_path_buf());
        }
    }

    /// Every path probed so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }

    /// Number of probes made for paths under `root`.
    pub fn calls_under(&self, root: &Path) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|p| p.starts_with(root))
            .count()
    }

    /// Forgets recorded calls.
    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl FileProbe for MemoryProbe {
    fn exists(&self, path: &Path) -> bool {
        self.calls.borrow_mut().push(path.to_path_buf());
        self.entries.contains(path)
    }
}
