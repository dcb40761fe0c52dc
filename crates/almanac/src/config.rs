//! Engine configuration.
//!
//! [`EngineConfig`] describes the install: where the plugin and its add-ons
//! live, which theme directories are active, and the policies that are not
//! user settings. It is usually loaded from YAML:
//!
//! ```yaml
//! plugin_dir: /srv/site/plugins/the-events-calendar
//! addons:
//!   - root: /srv/site/plugins/events-pro
//!     namespace: pro
//! theme:
//!   stylesheet: /srv/site/themes/child
//!   template: /srv/site/themes/parent
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use almanac_render::{
    BasePath, SearchConfig, DEFAULT_EXTENSION, DEFAULT_OVERRIDE_DIR, DEFAULT_VIEWS_DIR,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Post type of calendar events.
pub const EVENT_POST_TYPE: &str = "tribe_events";

/// Active theme directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDirs {
    /// The active (child) theme.
    pub stylesheet: PathBuf,
    /// The parent theme, when the active theme is a child theme.
    pub template: Option<PathBuf>,
}

impl ThemeDirs {
    /// Directories to search, child first. The parent is skipped when it is
    /// the same directory as the child.
    pub fn search_order(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.stylesheet.clone()];
        if let Some(parent) = &self.template {
            if parent != &self.stylesheet {
                dirs.push(parent.clone());
            }
        }
        dirs
    }

    /// Directory name of the active theme.
    pub fn stylesheet_name(&self) -> String {
        dir_name(&self.stylesheet)
    }

    /// Directory name of the parent theme, or of the active one if it has no parent.
    pub fn template_name(&self) -> String {
        dir_name(self.template.as_ref().unwrap_or(&self.stylesheet))
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Which post statuses an ajax view query includes.
///
/// The shipped default keeps the historical behavior: visitors without an
/// account get `private` only, logged-in users get `publish` and `private`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPolicy {
    pub member: Vec<String>,
    pub anonymous: Vec<String>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            member: vec!["publish".into(), "private".into()],
            anonymous: vec!["private".into()],
        }
    }
}

impl StatusPolicy {
    pub fn statuses(&self, logged_in: bool) -> &[String] {
        if logged_in {
            &self.member
        } else {
            &self.anonymous
        }
    }
}

/// Install-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the main plugin. Its views live under `views_dir`.
    pub plugin_dir: PathBuf,
    /// Add-ons contributing views, usually namespaced.
    pub addons: Vec<BasePath>,
    pub theme: ThemeDirs,
    /// Subdirectory of a theme that holds overrides.
    pub override_dir: String,
    /// Views directory, relative to each base path.
    pub views_dir: PathBuf,
    /// File extension appended to logical names.
    pub extension: String,
    /// Comments template used when comments must stay hidden. Defaults to
    /// `src/admin-views/no-comments.<ext>` under the plugin.
    pub no_comments_template: Option<PathBuf>,
    pub post_type: String,
    pub statuses: StatusPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plugin_dir: PathBuf::new(),
            addons: Vec::new(),
            theme: ThemeDirs::default(),
            override_dir: DEFAULT_OVERRIDE_DIR.into(),
            views_dir: DEFAULT_VIEWS_DIR.into(),
            extension: DEFAULT_EXTENSION.into(),
            no_comments_template: None,
            post_type: EVENT_POST_TYPE.into(),
            statuses: StatusPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration for a plugin and a theme.
    pub fn new(plugin_dir: impl Into<PathBuf>, theme: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            theme: ThemeDirs {
                stylesheet: theme.into(),
                template: None,
            },
            ..Self::default()
        }
    }

    /// Sets the parent theme.
    pub fn parent_theme(mut self, dir: impl Into<PathBuf>) -> Self {
        self.theme.template = Some(dir.into());
        self
    }

    /// Adds an add-on base path.
    pub fn addon(mut self, base: BasePath) -> Self {
        self.addons.push(base);
        self
    }

    /// Parses YAML and validates the result.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plugin_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("plugin_dir is empty".into()));
        }
        if self.theme.stylesheet.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("theme.stylesheet is empty".into()));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "extension must be a bare suffix, got {:?}",
                self.extension
            )));
        }
        Ok(())
    }

    /// The resolver search configuration: plugin first, then add-ons.
    pub fn search_config(&self) -> SearchConfig {
        let mut search = SearchConfig::new()
            .override_dir(self.override_dir.clone())
            .extension(self.extension.clone());
        search.views_dir = self.views_dir.clone();
        for dir in self.theme.search_order() {
            search = search.theme_dir(dir);
        }
        search = search.base_path(BasePath::new(self.plugin_dir.clone()));
        for addon in &self.addons {
            search = search.base_path(addon.clone());
        }
        search
    }

    /// The comments template that renders nothing.
    pub fn no_comments_template(&self) -> PathBuf {
        self.no_comments_template.clone().unwrap_or_else(|| {
            self.plugin_dir
                .join("src/admin-views")
                .join(format!("no-comments.{}", self.extension))
        })
    }
}
