//! Rendering a view inside the host's page template.
//!
//! When event pages use a host template, the view has to appear where the
//! host prints post content. The host only prints content while iterating
//! its result set, and an event query may have no results at all, so a
//! placeholder record is appended before the loop starts. The first content
//! callback of the main loop is then replaced by the view, the placeholder is
//! removed again, and the loop is told to stop.
//!
//! # States
//!
//! ```text
//! Idle ─arm─► AwaitingLoop ─loop_start(main, head done)─► LoopSeen
//!   │                                                        │
//!   └─(password-protected single, feed)─► Bypassed           ▼
//!                                                  ContentFilterArmed
//!                                                            │ first content callback
//!                                                            ▼
//!                                              Injected ─► Restored
//! ```
//!
//! Every transition happens at most once per request.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::request::QueryFlags;

/// One item of the host's result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub status: String,
    pub post_type: String,
    pub content: String,
    pub comment_status: String,
}

impl Record {
    /// The empty record appended to force the host into its loop.
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            title: String::new(),
            status: "draft".into(),
            post_type: "page".into(),
            content: String::new(),
            comment_status: "closed".into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }
}

/// The host's loop over its main result set.
pub trait HostLoop {
    /// Appends `placeholder`, updates the count and rewinds.
    fn begin_fake_iteration(&mut self, placeholder: Record);

    /// Removes the placeholder and restores count, cursor and current record.
    fn end_fake_iteration(&mut self);

    /// Stops the loop: no further iterations happen.
    fn terminate(&mut self);

    /// Replaces the record the host treats as current.
    fn set_current(&mut self, record: Record);

    /// The record the host treats as current.
    fn current_mut(&mut self) -> Option<&mut Record>;
}

/// An in-memory result set with the host's loop semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub records: Vec<Record>,
    /// Number of records the loop will visit.
    pub count: usize,
    /// Index of the record last visited; `None` before the first.
    pub cursor: Option<usize>,
    pub current: Option<Record>,
}

impl ResultSet {
    pub fn new(records: Vec<Record>) -> Self {
        let mut set = Self {
            count: records.len(),
            records,
            cursor: None,
            current: None,
        };
        set.rewind();
        set
    }

    pub fn has_next(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.count
    }

    /// Advances the loop and returns the new current record.
    pub fn next_record(&mut self) -> Option<&Record> {
        if !self.has_next() {
            return None;
        }
        let index = self.cursor.map_or(0, |c| c + 1);
        self.cursor = Some(index);
        self.current = self.records.get(index).cloned();
        self.current.as_ref()
    }

    fn rewind(&mut self) {
        self.cursor = None;
        self.current = self.records.first().cloned();
    }
}

impl HostLoop for ResultSet {
    fn begin_fake_iteration(&mut self, placeholder: Record) {
        self.records.push(placeholder);
        self.count = self.records.len();
        self.cursor = None;
        self.current = self.records.last().cloned();
    }

    fn end_fake_iteration(&mut self) {
        self.records.pop();
        self.count = self.records.len();
        self.rewind();
    }

    fn terminate(&mut self) {
        self.cursor = None;
        self.count = 0;
    }

    fn set_current(&mut self, record: Record) {
        self.current = Some(record);
    }

    fn current_mut(&mut self) -> Option<&mut Record> {
        self.current.as_mut()
    }
}

/// Where the injector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectorState {
    Idle,
    /// Nothing will be injected for this request.
    Bypassed,
    AwaitingLoop,
    LoopSeen,
    ContentFilterArmed,
    Injected,
    Restored,
}

/// Per-request injection state.
#[derive(Debug, Clone)]
pub struct Injector {
    state: InjectorState,
    head_complete: bool,
    spoofed: bool,
    post_spoof_pending: bool,
    comments_pending: bool,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    pub fn new() -> Self {
        Self {
            state: InjectorState::Idle,
            head_complete: false,
            spoofed: false,
            post_spoof_pending: false,
            comments_pending: false,
        }
    }

    pub fn state(&self) -> InjectorState {
        self.state
    }

    /// True while the placeholder is in the host's result set.
    pub fn is_spoofed(&self) -> bool {
        self.spoofed
    }

    /// Prepares injection for a request served by a host template.
    pub fn arm(&mut self, query: &QueryFlags) -> InjectorState {
        if self.state != InjectorState::Idle {
            return self.state;
        }
        self.state = if (query.single && query.password_required) || query.feed {
            InjectorState::Bypassed
        } else {
            InjectorState::AwaitingLoop
        };
        tracing::debug!(state = ?self.state, "injector armed");
        self.state
    }

    /// Appends the placeholder to the main result set.
    ///
    /// Runs during the document head, before the loop starts. Only the main
    /// event query of an armed request is touched.
    pub fn spoof_query(&mut self, query: &QueryFlags, host: &mut dyn HostLoop) -> bool {
        if self.state != InjectorState::AwaitingLoop
            || self.spoofed
            || !query.main_query
            || !query.event_query
        {
            return false;
        }
        host.begin_fake_iteration(Record::placeholder());
        self.spoofed = true;
        true
    }

    /// Records that the document head has been fully emitted.
    pub fn head_finished(&mut self) {
        self.head_complete = true;
    }

    /// Reacts to a loop starting. Returns true when the content callback was
    /// armed by this loop.
    ///
    /// Loops over secondary queries and loops started inside the document
    /// head are ignored.
    pub fn loop_start(&mut self, is_main_query: bool) -> bool {
        if self.state != InjectorState::AwaitingLoop || !is_main_query || !self.head_complete {
            return false;
        }
        self.state = InjectorState::LoopSeen;
        self.post_spoof_pending = true;
        self.comments_pending = true;
        self.state = InjectorState::ContentFilterArmed;
        tracing::debug!("content callback armed");
        true
    }

    /// The record to expose when the loop sets up its first item.
    pub fn the_post(&mut self) -> Option<Record> {
        if !self.post_spoof_pending {
            return None;
        }
        self.post_spoof_pending = false;
        Some(Record::placeholder())
    }

    /// Starts replacing a content callback. Returns false when the callback
    /// must be left alone.
    ///
    /// On true the placeholder has been removed and the caller renders the
    /// view, then calls [`finish_injection`](Self::finish_injection).
    pub fn begin_injection(&mut self, host: &mut dyn HostLoop) -> bool {
        if self.state != InjectorState::ContentFilterArmed {
            return false;
        }
        self.state = InjectorState::Injected;
        if self.spoofed {
            host.end_fake_iteration();
            self.spoofed = false;
        }
        true
    }

    /// Ends the host loop after the view rendered, unless the request is a
    /// not-found page.
    pub fn finish_injection(&mut self, query: &QueryFlags, host: &mut dyn HostLoop) {
        if self.state != InjectorState::Injected {
            return;
        }
        if !query.not_found {
            host.terminate();
        }
        self.state = InjectorState::Restored;
        tracing::debug!("view injected");
    }

    /// Picks the comments template, once per armed request.
    ///
    /// Comments stay hidden unless a single item is shown on its own and the
    /// `show_comments` setting is on.
    pub fn comments_template(
        &mut self,
        query: &QueryFlags,
        show_comments: bool,
        template: PathBuf,
        no_comments: &Path,
    ) -> PathBuf {
        if !self.comments_pending {
            return template;
        }
        self.comments_pending = false;

        if !query.single || query.showing_all || !show_comments {
            no_comments.to_path_buf()
        } else {
            template
        }
    }
}
