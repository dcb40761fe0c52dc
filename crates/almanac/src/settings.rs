//! Persisted user settings.
//!
//! Settings are the handful of options an administrator changes from the
//! host's settings screen: which views are enabled, the default view, how
//! event pages are wrapped. The engine reads them on every request and writes
//! back only when repairing a stale default view.
//!
//! Storage is behind [`SettingsStore`]. [`MemoryStore`] keeps everything in
//! process; [`FileStore`] persists to a YAML file.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Value of [`Settings::events_template`] that selects the host's page template.
pub const HOST_PAGE_TEMPLATE: &str = "default";

/// How event pages are wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode<'a> {
    /// The plugin's own wrapper template.
    PluginDefault,
    /// The host theme's page template, with the view injected into its loop.
    HostPage,
    /// A specific host theme file, with the view injected into its loop.
    HostFile(&'a str),
}

impl TemplateMode<'_> {
    /// True for the modes that render inside a host template.
    pub fn is_host(&self) -> bool {
        !matches!(self, TemplateMode::PluginDefault)
    }
}

/// The persisted options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wrapper selection: empty for the plugin template, `"default"` for the
    /// host page template, anything else names a host theme file.
    #[serde(rename = "tribeEventsTemplate")]
    pub events_template: String,
    /// Identifiers of the enabled views.
    #[serde(rename = "tribeEnableViews")]
    pub enabled_views: Vec<String>,
    /// Identifier of the default view.
    #[serde(rename = "viewOption")]
    pub default_view: String,
    #[serde(rename = "showComments")]
    pub show_comments: bool,
    #[serde(rename = "liveFiltersUpdate")]
    pub live_filters_update: bool,
    /// `"skeleton"`, `"full"` or `"tribe"`.
    #[serde(rename = "stylesheetOption")]
    pub stylesheet: String,
    #[serde(rename = "tribeEventsBeforeHTML")]
    pub before_html: String,
    #[serde(rename = "tribeEventsAfterHTML")]
    pub after_html: String,
    /// Blank the host document title for event pages.
    #[serde(rename = "modifyGlobalTitle")]
    pub modify_global_title: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            events_template: String::new(),
            enabled_views: vec!["list".into(), "month".into(), "day".into()],
            default_view: "month".into(),
            show_comments: false,
            live_filters_update: true,
            stylesheet: "tribe".into(),
            before_html: String::new(),
            after_html: String::new(),
            modify_global_title: false,
        }
    }
}

impl Settings {
    /// Interprets [`events_template`](Self::events_template).
    pub fn template_mode(&self) -> TemplateMode<'_> {
        match self.events_template.as_str() {
            "" => TemplateMode::PluginDefault,
            HOST_PAGE_TEMPLATE => TemplateMode::HostPage,
            file => TemplateMode::HostFile(file),
        }
    }

    /// True if `id` is in the enabled set.
    pub fn is_view_enabled(&self, id: &str) -> bool {
        self.enabled_views.iter().any(|v| v == id)
    }
}

/// Persistent settings storage.
pub trait SettingsStore {
    /// Returns the current settings.
    fn load(&self) -> Settings;

    /// Applies `change` and persists the result.
    fn update(&self, change: &mut dyn FnMut(&mut Settings)) -> Result<(), SettingsError>;
}

/// In-process settings, counting writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: RefCell<Settings>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(settings),
            writes: Cell::new(0),
        }
    }

    /// Number of successful [`update`](SettingsStore::update) calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Settings {
        self.settings.borrow().clone()
    }

    fn update(&self, change: &mut dyn FnMut(&mut Settings)) -> Result<(), SettingsError> {
        change(&mut self.settings.borrow_mut());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Settings persisted to a YAML file.
///
/// The file is read once on open; a missing file yields defaults and is
/// created on the first update.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    settings: RefCell<Settings>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                Settings::default()
            } else {
                serde_yaml::from_str(&content)?
            }
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            settings: RefCell::new(settings),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Settings {
        self.settings.borrow().clone()
    }

    fn update(&self, change: &mut dyn FnMut(&mut Settings)) -> Result<(), SettingsError> {
        let mut next = self.settings.borrow().clone();
        change(&mut next);

        let yaml = serde_yaml::to_string(&next)?;
        fs::write(&self.path, yaml).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "settings written");
        *self.settings.borrow_mut() = next;
        Ok(())
    }
}
