//! Registered view definitions.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::view::{View, ViewKind};

/// How a registered view is obtained.
#[derive(Clone)]
pub enum Implementation {
    /// A ready instance, shared by every lookup.
    Instance(Rc<dyn View>),
    /// A built-in kind, constructed on lookup.
    Kind(ViewKind),
}

impl Implementation {
    pub fn instantiate(&self) -> Rc<dyn View> {
        match self {
            Implementation::Instance(view) => Rc::clone(view),
            Implementation::Kind(kind) => kind.build(),
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Instance(view) => f.debug_tuple("Instance").field(&view.id()).finish(),
            Implementation::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
        }
    }
}

impl From<ViewKind> for Implementation {
    fn from(kind: ViewKind) -> Self {
        Implementation::Kind(kind)
    }
}

/// Registration properties. Unset fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewProperties {
    /// Whether URL rewrite rules are generated for the view.
    pub autogenerate_rewrite_rules: bool,
    /// URL slug; empty means the view identifier.
    pub rewrite_slug: String,
    /// The view shows a single item.
    pub is_single: bool,
    /// Ajax action name that requests this view.
    pub ajax_hook: Option<String>,
    /// Extra body class added while the view is displayed.
    pub body_class: Option<String>,
}

impl Default for ViewProperties {
    fn default() -> Self {
        Self {
            autogenerate_rewrite_rules: true,
            rewrite_slug: String::new(),
            is_single: false,
            ajax_hook: None,
            body_class: None,
        }
    }
}

/// A view as registered.
#[derive(Debug, Clone)]
pub struct ViewDefinition {
    pub id: String,
    pub title: String,
    pub implementation: Implementation,
    pub properties: ViewProperties,
}

impl ViewDefinition {
    /// The URL slug: the configured one, or the identifier.
    pub fn slug(&self) -> &str {
        if self.properties.rewrite_slug.is_empty() {
            &self.id
        } else {
            &self.properties.rewrite_slug
        }
    }
}
