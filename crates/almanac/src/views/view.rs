//! Renderable views.
//!
//! A view turns query results into markup. Most views are a logical template
//! name rendered with the result data; [`TemplateView`] covers that case and
//! the built-in [`ViewKind`]s construct one.

use std::rc::Rc;

use almanac_render::{RenderError, TemplateEngine, TemplateResolver};
use serde::{Deserialize, Serialize};

use super::definition::ViewProperties;

/// What a view needs to render.
pub struct RenderContext<'a> {
    pub resolver: &'a TemplateResolver,
    pub engine: &'a dyn TemplateEngine,
    /// Template data: the query results plus request details.
    pub data: &'a serde_json::Value,
}

/// A renderable view.
pub trait View {
    /// Identifier the view was built for.
    fn id(&self) -> &str;

    /// Logical template name rendered by [`render`](View::render).
    fn template(&self) -> &str;

    /// Renders the view's inner output.
    ///
    /// The default resolves [`template`](View::template) through the
    /// resolver, so theme overrides apply.
    fn render(&self, cx: &RenderContext<'_>) -> Result<String, RenderError> {
        let resolved = cx.resolver.resolve(self.template()).ok_or_else(|| {
            RenderError::TemplateNotFound(cx.resolver.config().normalize(self.template()))
        })?;
        cx.engine.render_file(&resolved, cx.data)
    }
}

/// A view rendering one logical template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateView {
    id: String,
    template: String,
}

impl TemplateView {
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
        }
    }
}

impl View for TemplateView {
    fn id(&self) -> &str {
        &self.id
    }

    fn template(&self) -> &str {
        &self.template
    }
}

/// The built-in views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    List,
    Month,
    Day,
    SingleEvent,
    Embed,
}

impl ViewKind {
    /// Kinds registered by default, in display order.
    pub const DEFAULTS: [ViewKind; 3] = [ViewKind::List, ViewKind::Month, ViewKind::Day];

    pub fn id(self) -> &'static str {
        match self {
            ViewKind::List => "list",
            ViewKind::Month => "month",
            ViewKind::Day => "day",
            ViewKind::SingleEvent => "single-event",
            ViewKind::Embed => "embed",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "list" => Some(ViewKind::List),
            "month" => Some(ViewKind::Month),
            "day" => Some(ViewKind::Day),
            "single-event" => Some(ViewKind::SingleEvent),
            "embed" => Some(ViewKind::Embed),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::List => "List",
            ViewKind::Month => "Month",
            ViewKind::Day => "Day",
            ViewKind::SingleEvent => "Event",
            ViewKind::Embed => "Embed",
        }
    }

    /// Logical template name of the view's inner output.
    pub fn template(self) -> &'static str {
        self.id()
    }

    /// Default properties for the kind.
    pub fn properties(self) -> ViewProperties {
        let (ajax_hook, body_class) = match self {
            ViewKind::List => (Some("tribe_list"), "events-list"),
            ViewKind::Month => (Some("tribe_calendar"), "events-gridview"),
            ViewKind::Day => (Some("tribe_event_day"), "tribe-events-day"),
            ViewKind::SingleEvent => (None, "single-tribe_events"),
            ViewKind::Embed => (None, "tribe-events-embed"),
        };
        ViewProperties {
            rewrite_slug: self.id().to_string(),
            is_single: matches!(self, ViewKind::SingleEvent),
            ajax_hook: ajax_hook.map(String::from),
            body_class: Some(body_class.to_string()),
            ..ViewProperties::default()
        }
    }

    /// Constructs the view.
    pub fn build(self) -> Rc<dyn View> {
        Rc::new(TemplateView::new(self.id(), self.template()))
    }
}
