//! Choosing the page template for a request.
//!
//! The host proposes a template; the chooser keeps it for anything that is
//! not an event request and otherwise decides between the host's not-found
//! template, the embed template, the plugin's own wrapper and a host page
//! template with the view injected into its loop.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::request::QueryFlags;
use crate::scope::RequestScope;
use crate::settings::TemplateMode;

/// Logical name of the plugin's wrapper template.
pub const DEFAULT_TEMPLATE: &str = "default-template";

/// Logical name of the embed template.
pub const EMBED_TEMPLATE: &str = "embed";

/// The outcome of template selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateChoice {
    /// Not an event request, or nothing better was found: the host's own choice.
    PassThrough(PathBuf),
    /// The host's not-found template.
    NotFound(PathBuf),
    /// The embed template.
    Embed(PathBuf),
    /// The plugin's wrapper template.
    PluginDefault(PathBuf),
    /// A host theme template; the view is injected into its loop.
    HostTemplate(PathBuf),
}

impl TemplateChoice {
    pub fn path(&self) -> &Path {
        match self {
            TemplateChoice::PassThrough(p)
            | TemplateChoice::NotFound(p)
            | TemplateChoice::Embed(p)
            | TemplateChoice::PluginDefault(p)
            | TemplateChoice::HostTemplate(p) => p,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            TemplateChoice::PassThrough(p)
            | TemplateChoice::NotFound(p)
            | TemplateChoice::Embed(p)
            | TemplateChoice::PluginDefault(p)
            | TemplateChoice::HostTemplate(p) => p,
        }
    }

    fn with_path(self, path: PathBuf) -> Self {
        match self {
            TemplateChoice::PassThrough(_) => TemplateChoice::PassThrough(path),
            TemplateChoice::NotFound(_) => TemplateChoice::NotFound(path),
            TemplateChoice::Embed(_) => TemplateChoice::Embed(path),
            TemplateChoice::PluginDefault(_) => TemplateChoice::PluginDefault(path),
            TemplateChoice::HostTemplate(_) => TemplateChoice::HostTemplate(path),
        }
    }
}

impl RequestScope<'_> {
    /// Chooses the page template, given the one the host proposed.
    ///
    /// Fires the template-chooser listeners first. Selections other than the
    /// pass-through and not-found cases go through the template-selection
    /// filter, and the result is remembered for the rest of the request.
    pub fn choose_template(
        &mut self,
        host_template: PathBuf,
    ) -> Result<TemplateChoice, EngineError> {
        let engine = self.engine();
        let query = self.context().query.clone();

        engine.hooks().run_template_chooser(&self.hook_context());
        let settings = engine.settings().load();
        self.titles.arm(&query, settings.modify_global_title);

        if !query.event_query {
            return Ok(TemplateChoice::PassThrough(host_template));
        }

        if query.single && query.not_found {
            tracing::debug!("single event not found");
            return Ok(TemplateChoice::NotFound(engine.theme().not_found_template()));
        }

        let displaying = query.event_display.as_deref().unwrap_or_default();
        if !query.single && !engine.registry().is_enabled(displaying) && displaying != "day" {
            tracing::debug!(view = displaying, "view not enabled");
            return Ok(TemplateChoice::NotFound(engine.theme().not_found_template()));
        }

        let choice = self.select_template(&query, host_template);
        let filtered = engine.hooks().run_template_selection(
            &self.hook_context().with_template(choice.path()),
            choice.path().to_path_buf(),
        )?;
        let choice = choice.with_path(filtered);

        tracing::debug!(template = %choice.path().display(), "template chosen");
        self.template = Some(choice.path().to_path_buf());
        Ok(choice)
    }

    fn select_template(&mut self, query: &QueryFlags, host_template: PathBuf) -> TemplateChoice {
        let engine = self.engine();

        if query.embed {
            return match engine.resolver().resolve_plugin(EMBED_TEMPLATE) {
                Some(t) => TemplateChoice::Embed(t.path),
                None => {
                    tracing::warn!("embed template missing, keeping host template");
                    TemplateChoice::PassThrough(host_template)
                }
            };
        }

        let settings = engine.settings().load();
        match settings.template_mode() {
            TemplateMode::PluginDefault => match engine.resolver().resolve(DEFAULT_TEMPLATE) {
                Some(t) => TemplateChoice::PluginDefault(t.path),
                None => {
                    tracing::warn!("default template missing, keeping host template");
                    TemplateChoice::PassThrough(host_template)
                }
            },
            mode => {
                self.injector.arm(query);
                TemplateChoice::HostTemplate(engine.theme().page_template(mode))
            }
        }
    }

    /// The inner template for the current request, after the view-template
    /// filter. `None` when the request shows none of the built-in views.
    ///
    /// Later rules win: an embed beats the listing views, a single event
    /// beats everything unless all its occurrences are shown.
    pub fn current_view_template(&self) -> Result<Option<PathBuf>, EngineError> {
        let engine = self.engine();
        let query = &self.context().query;
        let resolver = engine.resolver();

        let mut name = None;
        for view in ["list", "month", "day"] {
            if query.displays(view) {
                name = Some(view);
            }
        }
        if query.embed {
            name = Some(EMBED_TEMPLATE);
        }
        let is_event_post =
            query.post_type.as_deref() == Some(engine.config().post_type.as_str());
        if query.single && is_event_post && !query.showing_all && !query.embed {
            name = Some("single-event");
        }

        let template = name.and_then(|n| resolver.resolve(n)).map(|t| t.path);
        let Some(template) = template else {
            return Ok(None);
        };
        let filtered = engine
            .hooks()
            .run_view_template(&self.hook_context(), template)?;
        Ok(Some(filtered))
    }
}
