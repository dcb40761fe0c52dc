//! Choosing which view serves a request.
//!
//! Precedence:
//!
//! 1. The view named by the main query, when it is a genuine event query
//! 2. Otherwise, for ajax requests, the posted view or the view owning the
//!    posted action
//! 3. Otherwise the default view
//!
//! A requested view is used only if it is enabled. The default view is
//! repaired when it is no longer available: the first available view becomes
//! the new default and is persisted, so the repair happens once.

use crate::error::SettingsError;
use crate::request::RequestContext;
use crate::views::ViewRegistry;

/// Selects views against a registry.
#[derive(Debug, Clone, Copy)]
pub struct ViewSelector<'a> {
    registry: &'a ViewRegistry,
}

impl<'a> ViewSelector<'a> {
    pub fn new(registry: &'a ViewRegistry) -> Self {
        Self { registry }
    }

    /// The identifier of the view serving `ctx`, or `None` if nothing is
    /// enabled.
    pub fn select(&self, ctx: &RequestContext) -> Result<Option<String>, SettingsError> {
        let requested = requested_from_query(ctx).or_else(|| self.requested_from_ajax(ctx));

        if let Some(id) = requested {
            if self.registry.is_enabled(&id) {
                return Ok(Some(id));
            }
            tracing::debug!(view = %id, "requested view is not enabled");
        }

        let default = self.default_view()?;
        Ok(default.filter(|id| self.registry.is_enabled(id)))
    }

    /// The view named by a posted ajax request.
    ///
    /// A posted display value wins when it names a registered view; otherwise
    /// the action is matched against the views' ajax hooks.
    pub fn requested_from_ajax(&self, ctx: &RequestContext) -> Option<String> {
        if !ctx.ajax {
            return None;
        }
        if let Some(display) = ctx.posted.display.as_deref() {
            if self.registry.is_registered(display) {
                return Some(display.to_string());
            }
        }
        let action = ctx.posted.action.as_deref()?;
        self.registry.by_ajax_hook(action).map(|d| d.id.clone())
    }

    /// Identifiers offered to visitors: the enabled views.
    pub fn available(&self) -> Vec<String> {
        self.registry
            .list_enabled()
            .into_iter()
            .map(|d| d.id.clone())
            .collect()
    }

    /// The stored default view, repaired if it is no longer available.
    ///
    /// Returns `None` when no view is available; nothing is persisted then.
    pub fn default_view(&self) -> Result<Option<String>, SettingsError> {
        let stored = self.registry.settings().load().default_view;
        let available = self.available();

        if available.contains(&stored) {
            return Ok(Some(stored));
        }

        let Some(first) = available.into_iter().next() else {
            tracing::warn!(stored = %stored, "no view is available");
            return Ok(None);
        };

        tracing::info!(stored = %stored, replacement = %first, "default view repaired");
        self.registry
            .settings()
            .update(&mut |s| s.default_view = first.clone())?;
        Ok(Some(first))
    }
}

/// The view named by the main query, if it is an event query.
pub fn requested_from_query(ctx: &RequestContext) -> Option<String> {
    if !ctx.query.event_query {
        return None;
    }
    ctx.query.event_display.clone().filter(|v| !v.is_empty())
}
