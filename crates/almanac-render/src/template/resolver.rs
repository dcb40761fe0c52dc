//! Template path resolution across theme overrides and plugin views.
//!
//! [`TemplateResolver`] turns a logical template name (`"month"`,
//! `"pro/widgets/list"`) into a concrete file, searching in this order:
//!
//! | Tier | Location | Notes |
//! |------|----------|-------|
//! | 1 | `<theme>/<override_dir>/` exists at all? | Short-circuit: without it tiers 1b, 2 and 4 are skipped |
//! | 1b | `<theme>/<override_dir>/<name>` | Child theme first, then parent theme |
//! | 2 | `<theme>/<override_dir>/<name without namespace>` | Legacy, raises a deprecation notice |
//! | 3 | `<base>/<views_dir>/<name>` | Base paths in registration order |
//! | 4 | `<base>/<views_dir>/<namespace>/<name>` | Legacy, raises a deprecation notice |
//!
//! Whatever the tiers produce, including nothing, is finally passed through
//! the filters registered for that logical name.
//!
//! # Example
//!
//! ```rust
//! use almanac_render::{BasePath, MemoryProbe, SearchConfig, TemplateResolver};
//! use std::rc::Rc;
//!
//! let probe = Rc::new(MemoryProbe::new([
//!     "/plugin/src/views/month.php",
//!     "/theme/tribe-events/month.php",
//! ]));
//! let config = SearchConfig::new()
//!     .theme_dir("/theme")
//!     .base_path(BasePath::new("/plugin"));
//!
//! let resolver = TemplateResolver::new(config).with_probe(probe);
//! let resolved = resolver.resolve("month").unwrap();
//! assert_eq!(resolved.path, std::path::PathBuf::from("/theme/tribe-events/month.php"));
//! assert!(!resolved.legacy);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::deprecation::{
    DeprecationNotice, DeprecationSink, LegacyKind, LogSink, LEGACY_OVERRIDES_SINCE,
};
use crate::probe::{DiskProbe, FileProbe};

/// Default name of the override directory inside a theme.
pub const DEFAULT_OVERRIDE_DIR: &str = "tribe-events";

/// Default views directory inside a plugin base path.
pub const DEFAULT_VIEWS_DIR: &str = "src/views";

/// Default template file extension.
pub const DEFAULT_EXTENSION: &str = "php";

/// Rewrites a candidate path. Receives the candidate and the normalized name.
pub type PathFilterFn = Rc<dyn Fn(PathBuf, &str) -> PathBuf>;

/// Rewrites the final result for one logical name. May turn a miss into a hit.
pub type NamedFilterFn = Rc<dyn Fn(Option<PathBuf>) -> Option<PathBuf>>;

/// A plugin directory that ships view templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePath {
    /// Plugin root; views live under `<root>/<views_dir>`.
    pub root: PathBuf,
    /// Namespace prefix historically used for this plugin's templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl BasePath {
    /// A base path without namespace.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            namespace: None,
        }
    }

    /// A base path whose templates are addressed as `<namespace>/<name>`.
    pub fn namespaced(namespace: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let namespace = namespace.into();
        Self {
            root: root.into(),
            namespace: Some(namespace.trim_matches('/').to_string()).filter(|ns| !ns.is_empty()),
        }
    }
}

/// Where templates are searched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Active theme directories, child (stylesheet) theme first.
    pub theme_dirs: Vec<PathBuf>,
    /// Override directory name inside each theme.
    pub override_dir: String,
    /// Views directory inside each base path.
    pub views_dir: PathBuf,
    /// Template file extension, without the dot.
    pub extension: String,
    /// Plugin base paths in search order.
    pub base_paths: Vec<BasePath>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            theme_dirs: Vec::new(),
            override_dir: DEFAULT_OVERRIDE_DIR.to_string(),
            views_dir: PathBuf::from(DEFAULT_VIEWS_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            base_paths: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Creates a config with default directory names and no search roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a theme directory. Add the child theme before its parent.
    pub fn theme_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.theme_dirs.push(dir.into());
        self
    }

    /// Appends a plugin base path.
    pub fn base_path(mut self, base: BasePath) -> Self {
        self.base_paths.push(base);
        self
    }

    /// Sets the override directory name.
    pub fn override_dir(mut self, name: impl Into<String>) -> Self {
        self.override_dir = name.into();
        self
    }

    /// Sets the template extension.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    /// Appends the template extension to `name` unless already present.
    pub fn normalize(&self, name: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        }
    }
}

/// A template file chosen for a logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// The file to render.
    pub path: PathBuf,
    /// True when found through one of the legacy shims.
    pub legacy: bool,
    /// Normalized logical name it was resolved from.
    pub name: String,
}

/// Which tiers a lookup may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Everywhere,
    PluginOnly,
}

/// Resolves logical template names to files.
///
/// The resolver is built once and shared; lookups take `&self`.
pub struct TemplateResolver {
    config: SearchConfig,
    probe: Rc<dyn FileProbe>,
    sink: Rc<dyn DeprecationSink>,
    path_filters: Vec<PathFilterFn>,
    named_filters: HashMap<String, Vec<NamedFilterFn>>,
}

impl TemplateResolver {
    /// Creates a resolver probing the real filesystem and logging deprecations.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            probe: Rc::new(DiskProbe),
            sink: Rc::new(LogSink),
            path_filters: Vec::new(),
            named_filters: HashMap::new(),
        }
    }

    /// Replaces the filesystem probe.
    pub fn with_probe(mut self, probe: Rc<dyn FileProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replaces the deprecation sink.
    pub fn with_sink(mut self, sink: Rc<dyn DeprecationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Adds a filter applied to every override hit and every plugin candidate.
    pub fn path_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(PathBuf, &str) -> PathBuf + 'static,
    {
        self.path_filters.push(Rc::new(f));
        self
    }

    /// Adds a filter applied to the final result for one logical name.
    pub fn named_filter<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(Option<PathBuf>) -> Option<PathBuf> + 'static,
    {
        let key = self.config.normalize(name);
        self.named_filters.entry(key).or_default().push(Rc::new(f));
        self
    }

    /// The search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The probe used for existence checks.
    pub fn probe(&self) -> &dyn FileProbe {
        self.probe.as_ref()
    }

    /// Returns true if any theme carries an override directory.
    pub fn overrides_exist(&self) -> bool {
        self.config
            .theme_dirs
            .iter()
            .any(|dir| self.probe.exists(&dir.join(&self.config.override_dir)))
    }

    /// Resolves a logical name through every tier.
    pub fn resolve(&self, name: &str) -> Option<ResolvedTemplate> {
        self.resolve_scoped(name, &self.config.base_paths, Scope::Everywhere)
    }

    /// Resolves with an extra plugin root searched before the configured ones.
    ///
    /// The root is ignored if it is already one of the base paths.
    pub fn resolve_with_plugin_path(
        &self,
        name: &str,
        plugin_path: &Path,
    ) -> Option<ResolvedTemplate> {
        if self
            .config
            .base_paths
            .iter()
            .any(|base| base.root == plugin_path)
        {
            return self.resolve(name);
        }
        let mut bases = Vec::with_capacity(self.config.base_paths.len() + 1);
        bases.push(BasePath::new(plugin_path));
        bases.extend(self.config.base_paths.iter().cloned());
        self.resolve_scoped(name, &bases, Scope::Everywhere)
    }

    /// Resolves against plugin base paths only, ignoring theme overrides.
    pub fn resolve_plugin(&self, name: &str) -> Option<ResolvedTemplate> {
        self.resolve_scoped(name, &self.config.base_paths, Scope::PluginOnly)
    }

    fn resolve_scoped(
        &self,
        name: &str,
        bases: &[BasePath],
        scope: Scope,
    ) -> Option<ResolvedTemplate> {
        let name = self.config.normalize(name);
        let overrides = scope == Scope::Everywhere && self.overrides_exist();

        let mut found = None;
        if overrides {
            found = self
                .theme_override(&name)
                .or_else(|| self.unnamespaced_override(&name, bases));
        }
        if found.is_none() {
            found = self.plugin_view(&name, bases);
        }
        if found.is_none() && overrides {
            found = self.namespaced_plugin_view(&name, bases);
        }

        self.apply_named_filters(name, found)
    }

    /// Tier 1b: exact name under a theme's override directory.
    fn theme_override(&self, name: &str) -> Option<(PathBuf, bool)> {
        let file = self.locate_override(name)?;
        Some((self.apply_path_filters(file, name), false))
    }

    /// Tier 2: override stored without the namespace directory.
    fn unnamespaced_override(&self, name: &str, bases: &[BasePath]) -> Option<(PathBuf, bool)> {
        let file = bases
            .iter()
            .filter_map(|base| base.namespace.as_deref())
            .filter_map(|ns| name.strip_prefix(ns)?.strip_prefix('/'))
            .find_map(|stripped| self.locate_override(stripped))?;

        self.sink.notice(DeprecationNotice {
            kind: LegacyKind::UnnamespacedOverride,
            file: file.clone(),
            requested: name.to_string(),
            replacement: format!("{}/{}", self.config.override_dir, name),
            since: LEGACY_OVERRIDES_SINCE,
        });
        Some((file, true))
    }

    /// Tier 3: plugin views in base path order.
    fn plugin_view(&self, name: &str, bases: &[BasePath]) -> Option<(PathBuf, bool)> {
        bases.iter().find_map(|base| {
            let file = base.root.join(&self.config.views_dir).join(name);
            let file = self.apply_path_filters(file, name);
            self.probe.exists(&file).then_some((file, false))
        })
    }

    /// Tier 4: plugin view requested without its namespace.
    fn namespaced_plugin_view(&self, name: &str, bases: &[BasePath]) -> Option<(PathBuf, bool)> {
        bases.iter().find_map(|base| {
            let namespace = base.namespace.as_deref()?;
            let file = base
                .root
                .join(&self.config.views_dir)
                .join(namespace)
                .join(name);
            let file = self.apply_path_filters(file, name);
            if !self.probe.exists(&file) {
                return None;
            }
            self.sink.notice(DeprecationNotice {
                kind: LegacyKind::MissingNamespace,
                file: file.clone(),
                requested: name.to_string(),
                replacement: format!("{}/{}", namespace, name),
                since: LEGACY_OVERRIDES_SINCE,
            });
            Some((file, true))
        })
    }

    fn locate_override(&self, relative: &str) -> Option<PathBuf> {
        self.config
            .theme_dirs
            .iter()
            .map(|dir| dir.join(&self.config.override_dir).join(relative))
            .find(|path| self.probe.exists(path))
    }

    fn apply_path_filters(&self, file: PathBuf, name: &str) -> PathBuf {
        self.path_filters
            .iter()
            .fold(file, |current, filter| filter(current, name))
    }

    fn apply_named_filters(
        &self,
        name: String,
        found: Option<(PathBuf, bool)>,
    ) -> Option<ResolvedTemplate> {
        let Some(filters) = self.named_filters.get(&name) else {
            return found.map(|(path, legacy)| ResolvedTemplate { path, legacy, name });
        };

        let original = found.clone();
        let filtered = filters
            .iter()
            .fold(found.map(|(path, _)| path), |current, filter| filter(current));

        filtered.map(|path| {
            let legacy = matches!(&original, Some((p, true)) if *p == path);
            ResolvedTemplate { path, legacy, name }
        })
    }
}

impl fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateResolver")
            .field("config", &self.config)
            .field("path_filters", &self.path_filters.len())
            .field("named_filters", &self.named_filters.len())
            .finish()
    }
}
