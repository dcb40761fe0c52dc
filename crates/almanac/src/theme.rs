//! Host theme template lookup.
//!
//! Finds the host's own page, 404 and index templates, searching the active
//! theme before its parent. These are the templates the engine hands back
//! when it does not wrap a page itself.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use almanac_render::FileProbe;

use crate::config::ThemeDirs;
use crate::settings::TemplateMode;

/// Template searched when the host page template is configured.
pub const PAGE_TEMPLATE: &str = "page";

/// The active theme.
pub struct Theme {
    dirs: ThemeDirs,
    extension: String,
    probe: Rc<dyn FileProbe>,
}

impl Theme {
    pub fn new(dirs: ThemeDirs, extension: impl Into<String>, probe: Rc<dyn FileProbe>) -> Self {
        Self {
            dirs,
            extension: extension.into(),
            probe,
        }
    }

    pub fn dirs(&self) -> &ThemeDirs {
        &self.dirs
    }

    /// Returns the first existing file among `names`, each searched in the
    /// active theme and then its parent.
    pub fn locate(&self, names: &[&str]) -> Option<PathBuf> {
        let search = self.dirs.search_order();
        names
            .iter()
            .filter(|name| !name.is_empty())
            .map(|name| self.file_name(name))
            .find_map(|file| {
                search
                    .iter()
                    .map(|dir| dir.join(&file))
                    .find(|path| self.probe.exists(path))
            })
    }

    /// The page template for a host template mode.
    ///
    /// Falls back to the index template when the configured file is missing.
    pub fn page_template(&self, mode: TemplateMode<'_>) -> PathBuf {
        let name = match mode {
            TemplateMode::HostFile(file) => file,
            TemplateMode::HostPage | TemplateMode::PluginDefault => PAGE_TEMPLATE,
        };
        self.locate(&[name]).unwrap_or_else(|| {
            tracing::debug!(template = name, "host template missing, using index");
            self.index_template()
        })
    }

    /// The host's not-found template, or the index template if it has none.
    pub fn not_found_template(&self) -> PathBuf {
        self.locate(&["404"]).unwrap_or_else(|| self.index_template())
    }

    /// The host's index template. Every theme is expected to ship one; when
    /// it is missing the active theme's path is returned anyway.
    pub fn index_template(&self) -> PathBuf {
        self.locate(&["index"])
            .unwrap_or_else(|| self.dirs.stylesheet.join(self.file_name("index")))
    }

    fn file_name(&self, name: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        }
    }
}

impl fmt::Debug for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Theme")
            .field("dirs", &self.dirs)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
