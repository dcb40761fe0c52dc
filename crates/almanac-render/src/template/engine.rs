//! Template engine abstraction.
//!
//! Resolved view files are rendered through a [`TemplateEngine`]. The default
//! implementation is [`MiniJinjaEngine`].

use minijinja::{Environment, Value};

use super::resolver::ResolvedTemplate;
use crate::error::RenderError;

/// A template engine that can render template sources with data.
pub trait TemplateEngine {
    /// Renders `source` with `data`. `name` is used in error messages.
    fn render_source(
        &self,
        name: &str,
        source: &str,
        data: &serde_json::Value,
    ) -> Result<String, RenderError>;

    /// Reads a resolved file from disk and renders it.
    fn render_file(
        &self,
        template: &ResolvedTemplate,
        data: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let source =
            std::fs::read_to_string(&template.path).map_err(|source| RenderError::Read {
                path: template.path.clone(),
                source,
            })?;
        self.render_source(&template.name, &source, data)
    }
}

/// MiniJinja-based template engine.
///
/// # Example
///
/// ```rust
/// use almanac_render::{MiniJinjaEngine, TemplateEngine};
/// use serde_json::json;
///
/// let engine = MiniJinjaEngine::new();
/// let html = engine
///     .render_source("list.php", "{{ items | length }} events", &json!({"items": [1, 2]}))
///     .unwrap();
/// assert_eq!(html, "2 events");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates a new engine with the view filters registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        register_filters(&mut env);
        Self { env }
    }

    /// Mutable access to the environment, for registering extra filters.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_source(
        &self,
        name: &str,
        source: &str,
        data: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let ctx = Value::from_serialize(data);
        Ok(self.env.render_named_str(name, source, ctx)?)
    }
}

/// Registers the filters view templates rely on.
pub fn register_filters(env: &mut Environment<'static>) {
    // Pluralizing suffix: {{ count }} event{{ count | plural }}
    env.add_filter("plural", |count: i64| -> String {
        if count == 1 {
            String::new()
        } else {
            "s".to_string()
        }
    });
}
