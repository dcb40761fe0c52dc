//! Views and the view registry.
//!
//! - [`View`]: something that renders the inner output of an event page
//! - [`ViewKind`]: the built-in views
//! - [`ViewRegistry`]: identifiers to definitions, plus the enabled set

mod definition;
mod registry;
mod view;

pub use definition::{Implementation, ViewDefinition, ViewProperties};
pub use registry::{RegisteredFn, ViewRegistry};
pub use view::{RenderContext, TemplateView, View, ViewKind};
