//! # Almanac Render - Template Resolution for Calendar Views
//!
//! `almanac-render` decides which file renders a piece of view markup and
//! renders it. Themes may override any plugin template by placing a file of
//! the same logical name under their override directory; child themes win
//! over parent themes, and both win over the plugin's own views.
//!
//! ## Quick Start
//!
//! ```rust
//! use almanac_render::{BasePath, MemoryProbe, SearchConfig, TemplateResolver};
//! use std::rc::Rc;
//!
//! let probe = Rc::new(MemoryProbe::new(["/plugins/events/src/views/list.php"]));
//! let resolver = TemplateResolver::new(
//!     SearchConfig::new()
//!         .theme_dir("/themes/child")
//!         .theme_dir("/themes/parent")
//!         .base_path(BasePath::new("/plugins/events")),
//! )
//! .with_probe(probe);
//!
//! let list = resolver.resolve("list").unwrap();
//! assert!(list.path.ends_with("src/views/list.php"));
//! assert!(resolver.resolve("week").is_none());
//! ```
//!
//! ## Core Types
//!
//! - [`TemplateResolver`] and [`SearchConfig`]: the override hierarchy
//! - [`FileProbe`]: the only filesystem question resolution asks
//! - [`MiniJinjaEngine`]: renders resolved files
//! - [`RenderError`]: failures once a file has been chosen

mod error;
pub mod probe;
pub mod template;

pub use error::RenderError;
pub use probe::{DiskProbe, FileProbe, MemoryProbe};
pub use template::{
    register_filters, BasePath, CollectingSink, DeprecationNotice, DeprecationSink, LegacyKind,
    LogSink, MiniJinjaEngine, NamedFilterFn, PathFilterFn, ResolvedTemplate, SearchConfig,
    TemplateEngine, TemplateResolver, DEFAULT_EXTENSION, DEFAULT_OVERRIDE_DIR, DEFAULT_VIEWS_DIR,
    LEGACY_OVERRIDES_SINCE,
};
