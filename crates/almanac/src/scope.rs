//! Per-request state.
//!
//! A [`RequestScope`] is created when a request starts and dropped when it
//! ends. It holds the selected view, the chosen template, the injector and
//! the title guard, and exposes one method per host lifecycle point:
//!
//! ```text
//! Engine::request          view selection
//! choose_template          template choice (chooser)
//! on_document_title        title guard, before the placeholder exists
//! on_head                  placeholder appended to the main result set
//! on_head_finished
//! on_loop_start            content callback armed
//! on_the_post              placeholder exposed as the current record
//! on_content               view injected in place of the content
//! on_comments_template     comments hidden unless allowed
//! ajax_response            ajax requests only
//! ```

use std::path::{Path, PathBuf};
use std::rc::Rc;

use almanac_dispatch::{to_value, HookContext};
use serde::Serialize;

use crate::ajax::{EventSource, QueryArgs, QueryResult};
use crate::body_classes::{body_classes, BodyClassContext};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::injector::{HostLoop, Injector, InjectorState};
use crate::request::RequestContext;
use crate::selector::ViewSelector;
use crate::titles::TitleGuard;
use crate::views::{RenderContext, View};

/// The view chosen to serve a request.
#[derive(Clone)]
pub struct SelectedView {
    pub id: String,
    pub view: Rc<dyn View>,
}

impl std::fmt::Debug for SelectedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedView").field("id", &self.id).finish()
    }
}

/// Data handed to view templates.
#[derive(Serialize)]
struct ViewData<'a> {
    view: &'a str,
    page: u32,
    ajax: bool,
    args: &'a QueryArgs,
    #[serde(flatten)]
    result: &'a QueryResult,
}

/// State of one request.
pub struct RequestScope<'e> {
    engine: &'e Engine,
    ctx: RequestContext,
    selected: Option<SelectedView>,
    pub(crate) template: Option<PathBuf>,
    pub(crate) injector: Injector,
    pub(crate) titles: TitleGuard,
}

impl<'e> RequestScope<'e> {
    pub(crate) fn new(engine: &'e Engine, ctx: RequestContext) -> Result<Self, EngineError> {
        let selected = ViewSelector::new(engine.registry())
            .select(&ctx)?
            .and_then(|id| {
                let view = engine.registry().get(&id)?;
                Some(SelectedView { id, view })
            });

        match &selected {
            Some(s) => tracing::debug!(view = %s.id, ajax = ctx.ajax, "view selected"),
            None => tracing::debug!(ajax = ctx.ajax, "no view selected"),
        }

        Ok(Self {
            engine,
            ctx,
            selected,
            template: None,
            injector: Injector::new(),
            titles: TitleGuard::new(),
        })
    }

    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn selected(&self) -> Option<&SelectedView> {
        self.selected.as_ref()
    }

    pub fn has_selected_view(&self) -> bool {
        self.selected.is_some()
    }

    /// The template chosen by [`choose_template`](Self::choose_template).
    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn injector_state(&self) -> InjectorState {
        self.injector.state()
    }

    /// Host actions to bind for an ajax request: `wp_ajax_<hook>` and
    /// `wp_ajax_nopriv_<hook>` for the selected view's ajax hook.
    pub fn ajax_actions(&self) -> Vec<String> {
        if !self.ctx.ajax {
            return Vec::new();
        }
        self.selected
            .as_ref()
            .and_then(|s| self.engine.registry().definition(&s.id))
            .and_then(|d| d.properties.ajax_hook.as_deref())
            .map(|hook| vec![format!("wp_ajax_{}", hook), format!("wp_ajax_nopriv_{}", hook)])
            .unwrap_or_default()
    }

    pub(crate) fn hook_context(&self) -> HookContext {
        HookContext {
            view: self.selected.as_ref().map(|s| s.id.clone()),
            template: self.template.clone(),
            ajax: self.ctx.ajax,
        }
    }

    /// Query arguments for the selected view, from the posted form and the
    /// current query.
    pub(crate) fn query_args(&self, view: &str) -> QueryArgs {
        let config = self.engine.config();
        let mut args = QueryArgs::from_posted(
            view,
            &self.ctx.posted,
            &config.post_type,
            &config.statuses,
            self.ctx.logged_in,
        );
        if args.category.is_none() {
            args.category = self.ctx.query.category.clone();
        }
        args
    }

    /// Renders the selected view's inner output for a query result.
    pub(crate) fn render_inner(
        &self,
        selected: &SelectedView,
        args: &QueryArgs,
        result: &QueryResult,
    ) -> Result<String, EngineError> {
        let data = to_value(&ViewData {
            view: &selected.id,
            page: args.paged,
            ajax: self.ctx.ajax,
            args,
            result,
        })?;
        let html = selected.view.render(&RenderContext {
            resolver: self.engine.resolver(),
            engine: self.engine.renderer(),
            data: &data,
        })?;
        Ok(html)
    }

    /// Renders the selected view with its surrounding markup.
    ///
    /// Renders nothing when no view was selected.
    pub fn render_view(&self, source: &dyn EventSource) -> Result<String, EngineError> {
        let Some(selected) = &self.selected else {
            tracing::warn!("render requested without a selected view");
            return Ok(String::new());
        };

        let args = self.query_args(&selected.id);
        let result = source.query(&args).map_err(EngineError::Query)?;
        let inner = self.render_inner(selected, &args, &result)?;

        let settings = self.engine.settings().load();
        let wrapped = self.engine.hooks().run_wrap(&self.hook_context(), &inner)?;
        Ok(format!(
            "{}{}{}",
            settings.before_html, wrapped, settings.after_html
        ))
    }

    /// Document head: appends the placeholder record when the request is
    /// served by a host template.
    pub fn on_head(&mut self, host: &mut dyn HostLoop) -> bool {
        self.injector.spoof_query(&self.ctx.query, host)
    }

    pub fn on_head_finished(&mut self) {
        self.injector.head_finished();
    }

    /// Document title: blanks the current record's title when the guard is
    /// armed. The title itself is returned unchanged.
    pub fn on_document_title(&mut self, host: &mut dyn HostLoop, title: String) -> String {
        self.titles.blank(host.current_mut());
        title
    }

    /// A loop is starting.
    pub fn on_loop_start(&mut self, is_main_query: bool) -> bool {
        self.injector.loop_start(is_main_query)
    }

    /// The loop set up an item.
    pub fn on_the_post(&mut self, host: &mut dyn HostLoop) {
        if let Some(placeholder) = self.injector.the_post() {
            host.set_current(placeholder);
        }
    }

    /// The host is printing record content.
    ///
    /// The first call after the loop was armed returns the rendered view and
    /// ends the loop, also when rendering fails; every other call returns
    /// `content` unchanged.
    pub fn on_content(
        &mut self,
        host: &mut dyn HostLoop,
        content: String,
        source: &dyn EventSource,
    ) -> Result<String, EngineError> {
        if !self.injector.begin_injection(host) {
            return Ok(content);
        }
        self.titles.restore(host.current_mut());

        let html = self.render_view(source);
        self.injector.finish_injection(&self.ctx.query, host);
        html
    }

    /// The host is loading its comments template.
    pub fn on_comments_template(&mut self, template: PathBuf) -> PathBuf {
        let show_comments = self.engine.settings().load().show_comments;
        self.injector.comments_template(
            &self.ctx.query,
            show_comments,
            template,
            &self.engine.no_comments_template(),
        )
    }

    /// Appends the engine's `<body>` classes.
    pub fn body_classes(&self, classes: Vec<String>) -> Vec<String> {
        let config = self.engine.config();
        let settings = self.engine.settings().load();
        let view = self
            .selected
            .as_ref()
            .and_then(|s| self.engine.registry().definition(&s.id));

        body_classes(
            &BodyClassContext {
                theme: &config.theme,
                template: self.template.as_deref(),
                extension: &config.extension,
                settings: &settings,
                request: &self.ctx,
                view,
                post_type: &config.post_type,
            },
            classes,
        )
    }
}

impl std::fmt::Debug for RequestScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScope")
            .field("ctx", &self.ctx)
            .field("selected", &self.selected)
            .field("template", &self.template)
            .field("injector", &self.injector)
            .finish_non_exhaustive()
    }
}
