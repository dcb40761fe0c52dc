//! CSS classes for the page's `<body>` element.
//!
//! Classes describe the theme, the wrapper template, the live-filter setting
//! and the displayed view, so stylesheets can target event pages.

use std::path::Path;

use deunicode::deunicode;

use crate::config::ThemeDirs;
use crate::request::RequestContext;
use crate::settings::Settings;
use crate::views::ViewDefinition;

/// File name of the plugin's own wrapper template.
pub const DEFAULT_TEMPLATE_FILE: &str = "default-template";

/// Host template that must not get the `singular` class.
pub const SIDEBAR_PAGE_FILE: &str = "sidebar-page";

/// What the body classes are derived from.
#[derive(Debug, Clone, Copy)]
pub struct BodyClassContext<'a> {
    pub theme: &'a ThemeDirs,
    /// The template chosen for the request, if any.
    pub template: Option<&'a Path>,
    pub extension: &'a str,
    pub settings: &'a Settings,
    pub request: &'a RequestContext,
    /// The view serving the request.
    pub view: Option<&'a ViewDefinition>,
    pub post_type: &'a str,
}

/// Appends the engine's classes to `classes`.
pub fn body_classes(cx: &BodyClassContext<'_>, mut classes: Vec<String>) -> Vec<String> {
    classes.push(theme_class(cx.theme));
    if let Some(template) = cx.template {
        classes.push(template_class(template, cx.extension));
    }
    if live_filters(cx) {
        classes.push("tribe-filter-live".into());
    }
    view_classes(cx, &mut classes);
    singular_fix(cx, &mut classes);
    classes
}

fn theme_class(theme: &ThemeDirs) -> String {
    let parent = theme.template_name();
    let child = theme.stylesheet_name();
    if child == parent {
        format!("tribe-theme-{}", parent)
    } else {
        format!("tribe-theme-parent-{} tribe-theme-child-{}", parent, child)
    }
}

fn template_class(template: &Path, extension: &str) -> String {
    let file = template
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    if file == format!("{}.{}", DEFAULT_TEMPLATE_FILE, extension) {
        "tribe-events-page-template".into()
    } else {
        format!("page-template-{}", slugify(&file))
    }
}

fn live_filters(cx: &BodyClassContext<'_>) -> bool {
    !cx.request.admin
        && cx.settings.live_filters_update
        && cx.request.query.post_type.as_deref() == Some(cx.post_type)
}

fn view_classes(cx: &BodyClassContext<'_>, classes: &mut Vec<String>) {
    let Some(view) = cx.view else {
        return;
    };
    let query = &cx.request.query;

    if let Some(class) = &view.properties.body_class {
        classes.push(class.clone());
    }

    if let Some(category) = &query.category {
        classes.push("events-category".into());
        classes.push(format!("events-category-{}", category));
    }

    if !query.single || query.showing_all {
        for class in classes.iter_mut() {
            if class == "single-tribe_events" {
                *class = "events-list".into();
            }
        }
        classes.push("events-archive".into());
    }

    match cx.settings.stylesheet.as_str() {
        "skeleton" => classes.push("tribe-events-style-skeleton".into()),
        "full" => classes.push("tribe-events-style-full".into()),
        _ => {
            classes.push("tribe-events-style-full".into());
            classes.push("tribe-events-style-theme".into());
        }
    }
}

/// Host templates get `singular`, except the sidebar page template.
fn singular_fix(cx: &BodyClassContext<'_>, classes: &mut Vec<String>) {
    if !cx.settings.template_mode().is_host() {
        return;
    }
    let Some(template) = cx.template else {
        return;
    };
    let sidebar = cx
        .theme
        .stylesheet
        .join(format!("{}.{}", SIDEBAR_PAGE_FILE, cx.extension));

    if template == sidebar {
        classes.retain(|c| c != "singular");
    } else {
        classes.push("singular".into());
    }
}

/// Lowercase ASCII slug with single dashes between words.
pub fn slugify(title: &str) -> String {
    let transliterated = deunicode(title).to_lowercase();
    let mut slug = String::with_capacity(transliterated.len());
    for c in transliterated.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
