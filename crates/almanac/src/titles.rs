//! Guarding the host's document title.
//!
//! Some themes print the current record's title before the main loop starts.
//! On event pages that title belongs to whatever record the host happened to
//! load, so when `modify_global_title` is on, the title is blanked while the
//! document title is produced and restored right before a view renders.

use crate::injector::Record;
use crate::request::QueryFlags;

/// Per-request title guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleGuard {
    armed: bool,
    original: Option<String>,
}

impl TitleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the guard for event queries when the setting is on.
    pub fn arm(&mut self, query: &QueryFlags, enabled: bool) {
        self.armed = enabled && query.event_query;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Called while the document title is produced. Blanks the current
    /// record's title, remembering the first original.
    ///
    /// The placeholder record is left alone: its title is already empty and
    /// remembering it would overwrite the real title on restore.
    pub fn blank(&mut self, current: Option<&mut Record>) {
        if !self.armed {
            return;
        }
        let Some(record) = current.filter(|r| !r.is_placeholder()) else {
            return;
        };
        let title = std::mem::take(&mut record.title);
        self.original.get_or_insert(title);
    }

    /// Puts the original title back. Does nothing if nothing was blanked.
    pub fn restore(&mut self, current: Option<&mut Record>) {
        let Some(original) = self.original.take() else {
            return;
        };
        if let Some(record) = current {
            record.title = original;
        }
    }
}
