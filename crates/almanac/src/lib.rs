//! # Almanac - calendar views inside host themes
//!
//! Almanac decides which calendar view serves a request, which page template
//! wraps it, and how the view's markup gets into a host theme's page template
//! when the theme knows nothing about events.
//!
//! ## Core Concepts
//!
//! - [`ViewRegistry`]: registered views and the persisted enabled set
//! - [`ViewSelector`]: picks the view for a request, repairing a stale default
//! - [`TemplateChoice`]: the outcome of [`RequestScope::choose_template`]
//! - [`Injector`]: renders the view inside the host's main loop
//! - [`RequestScope::ajax_response`]: JSON answers for asynchronous view requests
//!
//! Template files are located by [`almanac_render::TemplateResolver`]:
//! theme overrides first, then plugin views, with shims for legacy override
//! layouts. Hooks from [`almanac_dispatch::Hooks`] can adjust every decision.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use almanac::{Engine, EngineConfig, FileStore, QueryFlags, RequestContext, ResultSet};
//! use almanac::{EventSource, QueryArgs, QueryResult};
//! use std::path::PathBuf;
//! use std::rc::Rc;
//!
//! let config = EngineConfig::load("almanac.yaml".as_ref())?;
//! let engine = Engine::builder(config)
//!     .settings(Rc::new(FileStore::open("settings.yaml")?))
//!     .default_views()
//!     .build()?;
//!
//! let source = |_: &QueryArgs| -> anyhow::Result<QueryResult> { Ok(QueryResult::default()) };
//!
//! let mut scope = engine.request(RequestContext::page(QueryFlags::events("list")))?;
//! scope.choose_template(PathBuf::from("/srv/themes/twenty/index.php"))?;
//!
//! let mut host = ResultSet::new(vec![]);
//! scope.on_head(&mut host);
//! scope.on_head_finished();
//! scope.on_loop_start(true);
//! while host.has_next() {
//!     host.next_record();
//!     scope.on_the_post(&mut host);
//!     print!("{}", scope.on_content(&mut host, String::new(), &source)?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Logging
//!
//! Decisions are logged with `tracing`; see [`setup::init_logging`].

mod ajax;
mod body_classes;
mod chooser;
mod config;
mod engine;
mod error;
mod injector;
mod request;
mod scope;
mod selector;
mod settings;
pub mod setup;
mod theme;
mod titles;
pub mod views;

pub use ajax::{AjaxPayload, EventSource, QueryArgs, QueryResult, SortOrder};
pub use body_classes::{body_classes, slugify, BodyClassContext};
pub use chooser::{TemplateChoice, DEFAULT_TEMPLATE, EMBED_TEMPLATE};
pub use config::{EngineConfig, StatusPolicy, ThemeDirs, EVENT_POST_TYPE};
pub use engine::{Engine, EngineBuilder};
pub use error::{ConfigError, EngineError, SettingsError};
pub use injector::{HostLoop, Injector, InjectorState, Record, ResultSet};
pub use request::{PostedParams, QueryFlags, RequestContext};
pub use scope::{RequestScope, SelectedView};
pub use selector::{requested_from_query, ViewSelector};
pub use settings::{FileStore, MemoryStore, Settings, SettingsStore, TemplateMode};
pub use theme::Theme;
pub use titles::TitleGuard;
pub use views::{
    Implementation, RenderContext, TemplateView, View, ViewDefinition, ViewKind, ViewProperties,
    ViewRegistry,
};

pub use almanac_dispatch::{HookContext, HookError, HookPhase, Hooks, Response};
pub use almanac_render::{BasePath, CollectingSink, MemoryProbe, MiniJinjaEngine, TemplateResolver};
