//! Hook system for the view request pipeline.
//!
//! Hooks let integrators adjust decisions and output at fixed points without
//! touching the engine. Every hook is a plain closure; filters receive a value
//! and return the (possibly replaced) value, wrappers contribute markup.
//!
//! # Pipeline Position
//!
//! ```text
//! request
//!   → TEMPLATE-CHOOSER listeners ← (notification only)
//!   → template choice
//!   → TEMPLATE-SELECTION filter ← (replace the chosen page template)
//!   → ... host renders, reaches the content slot ...
//!   → BEFORE-HTML wrappers
//!   → view output
//!   → AFTER-HTML wrappers
//!
//! ajax request
//!   → QUERY-ARGS filter ← (adjust the query before it runs)
//!   → RESPONSE filter   ← (adjust the structured payload)
//!   → RESPONSE-RAW filter ← (adjust the final body)
//! ```
//!
//! Filters run in registration order, each receiving the previous result. An
//! error from any hook aborts the chain.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

/// Read-only request facts handed to every hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookContext {
    /// Identifier of the view serving the request, if one was selected.
    pub view: Option<String>,
    /// Template chosen for the request, once known.
    pub template: Option<PathBuf>,
    /// True while serving an asynchronous view request.
    pub ajax: bool,
}

impl HookContext {
    /// Creates a context for the given view.
    pub fn for_view(view: impl Into<String>) -> Self {
        Self {
            view: Some(view.into()),
            ..Self::default()
        }
    }

    /// Marks the context as belonging to an ajax request.
    pub fn ajax(mut self) -> Self {
        self.ajax = true;
        self
    }

    /// Records the chosen template.
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// The pipeline point at which a hook error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Page template selection filter
    TemplateSelection,
    /// Inner view template filter
    ViewTemplate,
    /// Markup emitted before the view
    BeforeHtml,
    /// Markup emitted after the view
    AfterHtml,
    /// Ajax query arguments filter
    QueryArgs,
    /// Ajax structured response filter
    Response,
    /// Ajax raw body filter
    ResponseRaw,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPhase::TemplateSelection => "template-selection",
            HookPhase::ViewTemplate => "view-template",
            HookPhase::BeforeHtml => "before-html",
            HookPhase::AfterHtml => "after-html",
            HookPhase::QueryArgs => "query-args",
            HookPhase::Response => "response",
            HookPhase::ResponseRaw => "response-raw",
        };
        f.write_str(name)
    }
}

/// Error returned by a hook.
#[derive(Debug, Error)]
#[error("hook error ({phase}): {message}")]
pub struct HookError {
    /// Human-readable error message
    pub message: String,
    /// The hook phase where the error occurred
    pub phase: HookPhase,
    /// The underlying error source, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    /// Creates a hook error for the given phase.
    pub fn new(phase: HookPhase, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Notification without a return value.
pub type NotifyFn = Rc<dyn Fn(&HookContext)>;

/// Contributes markup around the view output.
pub type HtmlFn = Rc<dyn Fn(&HookContext) -> Result<String, HookError>>;

/// Replaces a template path.
pub type TemplateFn = Rc<dyn Fn(&HookContext, PathBuf) -> Result<PathBuf, HookError>>;

/// Replaces a structured value.
pub type ValueFn =
    Rc<dyn Fn(&HookContext, serde_json::Value) -> Result<serde_json::Value, HookError>>;

/// Replaces a response body.
pub type RawFn = Rc<dyn Fn(&HookContext, String) -> Result<String, HookError>>;

/// The hook table for one engine.
#[derive(Clone, Default)]
pub struct Hooks {
    template_chooser: Vec<NotifyFn>,
    template_selection: Vec<TemplateFn>,
    view_template: Vec<TemplateFn>,
    before_html: Vec<HtmlFn>,
    after_html: Vec<HtmlFn>,
    query_args: Vec<ValueFn>,
    response: Vec<ValueFn>,
    response_raw: Vec<RawFn>,
}

impl Hooks {
    /// Creates a new empty hook table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.template_chooser.is_empty()
            && self.template_selection.is_empty()
            && self.view_template.is_empty()
            && self.before_html.is_empty()
            && self.after_html.is_empty()
            && self.query_args.is_empty()
            && self.response.is_empty()
            && self.response_raw.is_empty()
    }

    /// Adds a listener fired whenever the template chooser runs.
    pub fn on_template_chooser<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext) + 'static,
    {
        self.template_chooser.push(Rc::new(f));
        self
    }

    /// Adds a filter over the chosen page template.
    ///
    /// # Example
    ///
    /// ```rust
    /// use almanac_dispatch::Hooks;
    /// use std::path::PathBuf;
    ///
    /// let hooks = Hooks::new().template_selection(|_ctx, path| {
    ///     if path.ends_with("page.php") {
    ///         Ok(PathBuf::from("/themes/site/full-width.php"))
    ///     } else {
    ///         Ok(path)
    ///     }
    /// });
    /// # assert!(!hooks.is_empty());
    /// ```
    pub fn template_selection<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext, PathBuf) -> Result<PathBuf, HookError> + 'static,
    {
        self.template_selection.push(Rc::new(f));
        self
    }

    /// Adds a filter over the inner view template.
    pub fn view_template<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext, PathBuf) -> Result<PathBuf, HookError> + 'static,
    {
        self.view_template.push(Rc::new(f));
        self
    }

    /// Adds markup emitted before the view output.
    pub fn before_html<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext) -> Result<String, HookError> + 'static,
    {
        self.before_html.push(Rc::new(f));
        self
    }

    /// Adds markup emitted after the view output.
    pub fn after_html<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext) -> Result<String, HookError> + 'static,
    {
        self.after_html.push(Rc::new(f));
        self
    }

    /// Adds a filter over the ajax query arguments.
    pub fn query_args<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext, serde_json::Value) -> Result<serde_json::Value, HookError> + 'static,
    {
        self.query_args.push(Rc::new(f));
        self
    }

    /// Adds a filter over the structured ajax response.
    pub fn response<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext, serde_json::Value) -> Result<serde_json::Value, HookError> + 'static,
    {
        self.response.push(Rc::new(f));
        self
    }

    /// Adds a filter over the final ajax body.
    pub fn response_raw<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookContext, String) -> Result<String, HookError> + 'static,
    {
        self.response_raw.push(Rc::new(f));
        self
    }

    /// Fires all template-chooser listeners.
    pub fn run_template_chooser(&self, ctx: &HookContext) {
        for hook in &self.template_chooser {
            hook(ctx);
        }
    }

    /// Runs the template-selection filters.
    pub fn run_template_selection(
        &self,
        ctx: &HookContext,
        template: PathBuf,
    ) -> Result<PathBuf, HookError> {
        chain(&self.template_selection, ctx, template)
    }

    /// Runs the view-template filters.
    pub fn run_view_template(
        &self,
        ctx: &HookContext,
        template: PathBuf,
    ) -> Result<PathBuf, HookError> {
        chain(&self.view_template, ctx, template)
    }

    /// Wraps `body` with the before/after markup.
    pub fn run_wrap(&self, ctx: &HookContext, body: &str) -> Result<String, HookError> {
        let mut out = String::new();
        for hook in &self.before_html {
            out.push_str(&hook(ctx)?);
        }
        out.push_str(body);
        for hook in &self.after_html {
            out.push_str(&hook(ctx)?);
        }
        Ok(out)
    }

    /// Runs the query-args filters.
    pub fn run_query_args(
        &self,
        ctx: &HookContext,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, HookError> {
        chain(&self.query_args, ctx, args)
    }

    /// Runs the structured response filters.
    pub fn run_response(
        &self,
        ctx: &HookContext,
        response: serde_json::Value,
    ) -> Result<serde_json::Value, HookError> {
        chain(&self.response, ctx, response)
    }

    /// Runs the raw body filters.
    pub fn run_response_raw(&self, ctx: &HookContext, body: String) -> Result<String, HookError> {
        chain(&self.response_raw, ctx, body)
    }
}

fn chain<T>(
    hooks: &[Rc<dyn Fn(&HookContext, T) -> Result<T, HookError>>],
    ctx: &HookContext,
    value: T,
) -> Result<T, HookError> {
    hooks.iter().try_fold(value, |current, hook| hook(ctx, current))
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("template_chooser_count", &self.template_chooser.len())
            .field("template_selection_count", &self.template_selection.len())
            .field("view_template_count", &self.view_template.len())
            .field("before_html_count", &self.before_html.len())
            .field("after_html_count", &self.after_html.len())
            .field("query_args_count", &self.query_args.len())
            .field("response_count", &self.response.len())
            .field("response_raw_count", &self.response_raw.len())
            .finish()
    }
}
