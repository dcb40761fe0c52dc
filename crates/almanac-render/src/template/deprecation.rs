//! Deprecation notices for stale override locations.
//!
//! Theme overrides used to live directly under the override directory even for
//! templates that belong to a namespace. Those files still resolve, but every
//! hit is reported through a [`DeprecationSink`].

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;

/// Version in which namespaced override locations became the norm.
pub const LEGACY_OVERRIDES_SINCE: &str = "3.2";

/// Which compatibility shim located the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKind {
    /// A theme override stored without its namespace directory.
    UnnamespacedOverride,
    /// A namespaced plugin view requested without its namespace.
    MissingNamespace,
}

/// One deprecated override hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// How the file was found.
    pub kind: LegacyKind,
    /// The file that was used.
    pub file: PathBuf,
    /// The normalized logical name that was requested.
    pub requested: String,
    /// Where the template should be requested from or moved to.
    pub replacement: String,
    /// Version that deprecated the location.
    pub since: &'static str,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LegacyKind::UnnamespacedOverride => write!(
                f,
                "Template overrides should be moved to the correct subdirectory: {} (use {})",
                self.file.display(),
                self.replacement
            ),
            LegacyKind::MissingNamespace => write!(
                f,
                "Template overrides should be moved to the correct subdirectory: '{}' (use '{}')",
                self.requested, self.replacement
            ),
        }
    }
}

/// Receives deprecation notices raised during resolution.
pub trait DeprecationSink {
    /// Records a notice. Resolution continues with the legacy file.
    fn notice(&self, notice: DeprecationNotice);
}

/// Sink that reports notices through `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DeprecationSink for LogSink {
    fn notice(&self, notice: DeprecationNotice) {
        tracing::warn!(
            target: "almanac::deprecated",
            file = %notice.file.display(),
            replacement = %notice.replacement,
            since = notice.since,
            "{}",
            notice
        );
    }
}

/// Sink that keeps notices in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    notices: RefCell<Vec<DeprecationNotice>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn notices(&self) -> Vec<DeprecationNotice> {
        self.notices.borrow().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<DeprecationNotice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }
}

impl DeprecationSink for CollectingSink {
    fn notice(&self, notice: DeprecationNotice) {
        LogSink.notice(notice.clone());
        self.notices.borrow_mut().push(notice);
    }
}
