//! The engine and its builder.
//!
//! An [`Engine`] is built once per process and owns everything that outlives
//! a request: configuration, the view registry, the template resolver, the
//! host theme, hooks and the renderer. Each request is served through a
//! [`RequestScope`] borrowed from it.
//!
//! ```rust,no_run
//! use almanac::{Engine, EngineConfig, MemoryStore, QueryFlags, RequestContext};
//! use std::path::PathBuf;
//! use std::rc::Rc;
//!
//! let config = EngineConfig::new("/srv/plugins/tec", "/srv/themes/twenty");
//! let engine = Engine::builder(config)
//!     .settings(Rc::new(MemoryStore::default()))
//!     .default_views()
//!     .build()?;
//!
//! let mut scope = engine.request(RequestContext::page(QueryFlags::events("month")))?;
//! let choice = scope.choose_template(PathBuf::from("/srv/themes/twenty/index.php"))?;
//! println!("{}", choice.path().display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use almanac_dispatch::Hooks;
use almanac_render::{
    DeprecationSink, DiskProbe, FileProbe, LogSink, MiniJinjaEngine, TemplateEngine,
    TemplateResolver,
};

use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError};
use crate::request::RequestContext;
use crate::scope::RequestScope;
use crate::settings::{MemoryStore, SettingsStore};
use crate::theme::Theme;
use crate::views::{
    Implementation, RegisteredFn, ViewDefinition, ViewKind, ViewProperties, ViewRegistry,
};

type ResolverFn = Box<dyn FnOnce(TemplateResolver) -> TemplateResolver>;

struct PendingView {
    id: String,
    title: String,
    implementation: Implementation,
    properties: ViewProperties,
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    config: EngineConfig,
    settings: Option<Rc<dyn SettingsStore>>,
    probe: Option<Rc<dyn FileProbe>>,
    sink: Option<Rc<dyn DeprecationSink>>,
    renderer: Option<Box<dyn TemplateEngine>>,
    hooks: Hooks,
    listeners: Vec<RegisteredFn>,
    views: Vec<PendingView>,
    resolver_setup: Vec<ResolverFn>,
}

impl EngineBuilder {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            settings: None,
            probe: None,
            sink: None,
            renderer: None,
            hooks: Hooks::new(),
            listeners: Vec::new(),
            views: Vec::new(),
            resolver_setup: Vec::new(),
        }
    }

    /// Sets the settings store. Defaults to an in-memory store with default
    /// settings.
    pub fn settings(mut self, store: Rc<dyn SettingsStore>) -> Self {
        self.settings = Some(store);
        self
    }

    /// Sets the file probe used for template and theme lookups.
    pub fn probe(mut self, probe: Rc<dyn FileProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sets the receiver of legacy-override notices.
    pub fn deprecation_sink(mut self, sink: Rc<dyn DeprecationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the template renderer. Defaults to [`MiniJinjaEngine`].
    pub fn renderer<E: TemplateEngine + 'static>(mut self, renderer: E) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Adjusts the resolver once it is built, e.g. to add path filters.
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TemplateResolver) -> TemplateResolver + 'static,
    {
        self.resolver_setup.push(Box::new(f));
        self
    }

    /// Adds a listener fired for every view registered by the builder.
    pub fn on_view_registered<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ViewDefinition) + 'static,
    {
        self.listeners.push(Rc::new(f));
        self
    }

    /// Registers a view.
    pub fn view(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        implementation: impl Into<Implementation>,
        properties: ViewProperties,
    ) -> Self {
        self.views.push(PendingView {
            id: id.into(),
            title: title.into(),
            implementation: implementation.into(),
            properties,
        });
        self
    }

    /// Registers the list, month and day views.
    pub fn default_views(mut self) -> Self {
        for kind in ViewKind::DEFAULTS {
            self = self.view(kind.id(), kind.title(), kind, kind.properties());
        }
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> Result<Engine, ConfigError> {
        self.config.validate()?;

        let settings = self
            .settings
            .unwrap_or_else(|| Rc::new(MemoryStore::default()));
        let probe = self.probe.unwrap_or_else(|| Rc::new(DiskProbe));
        let sink = self.sink.unwrap_or_else(|| Rc::new(LogSink));

        let mut resolver = TemplateResolver::new(self.config.search_config())
            .with_probe(Rc::clone(&probe))
            .with_sink(sink);
        for setup in self.resolver_setup {
            resolver = setup(resolver);
        }

        let theme = Theme::new(
            self.config.theme.clone(),
            self.config.extension.clone(),
            probe,
        );

        let mut registry = ViewRegistry::new(Rc::clone(&settings));
        for listener in self.listeners {
            registry.on_registered(move |def| listener(def));
        }
        for view in self.views {
            registry.register(view.id, view.title, view.implementation, view.properties);
        }

        tracing::debug!(
            views = registry.len(),
            plugin = %self.config.plugin_dir.display(),
            "engine built"
        );

        Ok(Engine {
            config: self.config,
            settings,
            registry,
            resolver,
            theme,
            hooks: self.hooks,
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(MiniJinjaEngine::new())),
        })
    }
}

/// Process-wide view machinery.
pub struct Engine {
    config: EngineConfig,
    settings: Rc<dyn SettingsStore>,
    registry: ViewRegistry,
    resolver: TemplateResolver,
    theme: Theme,
    hooks: Hooks,
    renderer: Box<dyn TemplateEngine>,
}

impl Engine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Starts serving a request: selects its view.
    pub fn request(&self, ctx: RequestContext) -> Result<RequestScope<'_>, EngineError> {
        RequestScope::new(self, ctx)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Mutable registry access, for views registered after start-up.
    pub fn registry_mut(&mut self) -> &mut ViewRegistry {
        &mut self.registry
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn renderer(&self) -> &dyn TemplateEngine {
        self.renderer.as_ref()
    }

    /// The comments template that renders nothing.
    pub fn no_comments_template(&self) -> PathBuf {
        self.config.no_comments_template()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
