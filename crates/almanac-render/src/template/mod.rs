//! Template resolution and rendering.
//!
//! - [`TemplateResolver`]: maps a logical name to a file through theme
//!   overrides, legacy locations and plugin views.
//! - [`TemplateEngine`]: renders the chosen file with view data.
//! - [`DeprecationSink`]: receives notices for files found in legacy locations.

pub mod deprecation;
mod engine;
pub mod resolver;

pub use deprecation::{
    CollectingSink, DeprecationNotice, DeprecationSink, LegacyKind, LogSink,
    LEGACY_OVERRIDES_SINCE,
};
pub use engine::{register_filters, MiniJinjaEngine, TemplateEngine};
pub use resolver::{
    BasePath, NamedFilterFn, PathFilterFn, ResolvedTemplate, SearchConfig, TemplateResolver,
    DEFAULT_EXTENSION, DEFAULT_OVERRIDE_DIR, DEFAULT_VIEWS_DIR,
};
