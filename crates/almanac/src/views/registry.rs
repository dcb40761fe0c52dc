//! The view registry.
//!
//! Maps view identifiers to their definitions, in registration order, and
//! answers whether a view is enabled by consulting the persisted settings.
//! The registry lives for the whole process; it is filled while the engine is
//! built and read on every request.

use std::fmt;
use std::rc::Rc;

use crate::error::SettingsError;
use crate::settings::SettingsStore;

use super::definition::{Implementation, ViewDefinition, ViewProperties};
use super::view::{View, ViewKind};

/// Called after a view is registered. May rewrite the definition.
pub type RegisteredFn = Rc<dyn Fn(&mut ViewDefinition)>;

/// Registered views.
pub struct ViewRegistry {
    views: Vec<ViewDefinition>,
    listeners: Vec<RegisteredFn>,
    settings: Rc<dyn SettingsStore>,
}

impl ViewRegistry {
    /// Creates an empty registry backed by `settings`.
    pub fn new(settings: Rc<dyn SettingsStore>) -> Self {
        Self {
            views: Vec::new(),
            listeners: Vec::new(),
            settings,
        }
    }

    /// Adds a listener fired after every later registration.
    pub fn on_registered<F>(&mut self, f: F)
    where
        F: Fn(&mut ViewDefinition) + 'static,
    {
        self.listeners.push(Rc::new(f));
    }

    /// Registers (or re-registers) a view.
    ///
    /// An empty rewrite slug becomes the identifier. Re-registering an
    /// identifier replaces the definition in place, so the view keeps its
    /// position.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        implementation: impl Into<Implementation>,
        properties: ViewProperties,
    ) -> &ViewDefinition {
        let mut definition = ViewDefinition {
            id: id.into(),
            title: title.into(),
            implementation: implementation.into(),
            properties,
        };
        let id = definition.id.clone();
        if definition.properties.rewrite_slug.is_empty() {
            definition.properties.rewrite_slug = id.clone();
        }

        for listener in &self.listeners {
            listener(&mut definition);
        }
        // Listeners may not move the view to another identifier.
        definition.id = id;

        let index = match self.views.iter().position(|v| v.id == definition.id) {
            Some(index) => {
                tracing::debug!(view = %definition.id, "view re-registered");
                self.views[index] = definition;
                index
            }
            None => {
                tracing::debug!(view = %definition.id, "view registered");
                self.views.push(definition);
                self.views.len() - 1
            }
        };
        &self.views[index]
    }

    /// Registers a built-in kind with its default title and properties.
    pub fn register_kind(&mut self, kind: ViewKind) -> &ViewDefinition {
        self.register(kind.id(), kind.title(), kind, kind.properties())
    }

    /// Returns the view registered under `id`, constructing it if needed.
    pub fn get(&self, id: &str) -> Option<Rc<dyn View>> {
        self.definition(id).map(|d| d.implementation.instantiate())
    }

    pub fn definition(&self, id: &str) -> Option<&ViewDefinition> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.definition(id).is_some()
    }

    /// True if `id` is registered and in the persisted enabled set.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.is_registered(id) && self.settings.load().is_view_enabled(id)
    }

    /// Adds `id` to the persisted enabled set.
    ///
    /// Returns false, without writing, for unregistered and already enabled
    /// views.
    pub fn enable(&self, id: &str) -> Result<bool, SettingsError> {
        if !self.is_registered(id) || self.settings.load().is_view_enabled(id) {
            return Ok(false);
        }
        self.settings
            .update(&mut |s| s.enabled_views.push(id.to_string()))?;
        tracing::info!(view = %id, "view enabled");
        Ok(true)
    }

    /// Enabled views, in registration order.
    pub fn list_enabled(&self) -> Vec<&ViewDefinition> {
        let settings = self.settings.load();
        self.views
            .iter()
            .filter(|v| settings.is_view_enabled(&v.id))
            .collect()
    }

    /// All registered views, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ViewDefinition> {
        self.views.iter()
    }

    /// The view answering the ajax action `action`.
    pub fn by_ajax_hook(&self, action: &str) -> Option<&ViewDefinition> {
        self.views
            .iter()
            .find(|v| v.properties.ajax_hook.as_deref() == Some(action))
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views", &self.views.iter().map(|v| &v.id).collect::<Vec<_>>())
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}
