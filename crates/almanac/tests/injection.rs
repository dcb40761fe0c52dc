//! Rendering views inside a host page template.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use almanac::{
    Engine, EngineConfig, HostLoop, Hooks, InjectorState, MemoryStore, QueryArgs, QueryFlags,
    QueryResult, Record, RequestContext, ResultSet, Settings,
};
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn site() -> (TempDir, EngineConfig) {
    let root = tempfile::tempdir().unwrap();
    let write = |relative: &str, content: &str| {
        let path = root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    };
    write(
        "plugin/src/views/list.php",
        "<ul>{% for e in items %}<li>{{ e.title }}</li>{% endfor %}</ul>",
    );
    write("themes/site/page.php", "");
    write("themes/site/tribe-events/month.php", "<table>{{ total_count }}</table>");

    let config = EngineConfig::new(root.path().join("plugin"), root.path().join("themes/site"));
    (root, config)
}

fn host_page_settings() -> Settings {
    Settings {
        events_template: "default".into(),
        before_html: "<section>".into(),
        after_html: "</section>".into(),
        ..Settings::default()
    }
}

fn source(_: &QueryArgs) -> anyhow::Result<QueryResult> {
    Ok(QueryResult {
        items: vec![json!({"title": "Jazz Night"}), json!({"title": "Blues Brunch"})],
        max_pages: 1,
        total_count: 2,
    })
}

fn record(id: u64, title: &str) -> Record {
    Record {
        id,
        title: title.into(),
        status: "publish".into(),
        post_type: "tribe_events".into(),
        ..Record::default()
    }
}

/// Drives the host's main loop, returning what each iteration printed.
fn run_loop(scope: &mut almanac::RequestScope<'_>, host: &mut ResultSet) -> Vec<String> {
    let mut printed = Vec::new();
    scope.on_loop_start(true);
    while host.has_next() {
        host.next_record();
        scope.on_the_post(host);
        let content = host
            .current
            .as_ref()
            .map(|r| r.content.clone())
            .unwrap_or_default();
        printed.push(scope.on_content(host, content, &source).unwrap());
    }
    printed
}

#[test]
fn test_view_replaces_loop_of_empty_result_set() {
    let (_root, config) = site();
    let hooks = Hooks::new()
        .before_html(|ctx| Ok(format!("<div data-view=\"{}\">", ctx.view.as_deref().unwrap_or(""))))
        .after_html(|_| Ok("</div>".into()));
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(host_page_settings())))
        .hooks(hooks)
        .default_views()
        .build()
        .unwrap();

    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("list")))
        .unwrap();
    scope.choose_template(PathBuf::from("/host/index.php")).unwrap();

    let mut host = ResultSet::new(vec![]);
    assert!(scope.on_head(&mut host));
    assert_eq!(host.count, 1);
    scope.on_head_finished();

    let printed = run_loop(&mut scope, &mut host);
    assert_eq!(
        printed,
        vec![
            "<section><div data-view=\"list\"><ul><li>Jazz Night</li><li>Blues Brunch</li></ul></div></section>"
        ]
    );
    assert_eq!(scope.injector_state(), InjectorState::Restored);
    assert!(host.records.is_empty());
    assert_eq!(host.count, 0);
}

#[test]
fn test_loop_with_records_prints_view_once() {
    let (_root, config) = site();
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(host_page_settings())))
        .default_views()
        .build()
        .unwrap();

    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("month")))
        .unwrap();
    scope.choose_template(PathBuf::from("/host/index.php")).unwrap();

    let mut host = ResultSet::new(vec![record(1, "Jazz Night"), record(2, "Blues Brunch")]);
    scope.on_head(&mut host);
    scope.on_head_finished();

    let printed = run_loop(&mut scope, &mut host);
    assert_eq!(printed, vec!["<section><table>2</table></section>"]);
    assert_eq!(host.records.len(), 2);
}

#[test]
fn test_failed_render_still_ends_loop() {
    let (_root, config) = site();
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(host_page_settings())))
        .default_views()
        .build()
        .unwrap();

    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("list")))
        .unwrap();
    scope.choose_template(PathBuf::from("/host/index.php")).unwrap();
    let mut host = ResultSet::new(vec![record(1, "Jazz Night")]);
    scope.on_head(&mut host);
    scope.on_head_finished();
    scope.on_loop_start(true);
    host.next_record();
    scope.on_the_post(&mut host);

    let failing = |_: &QueryArgs| -> anyhow::Result<QueryResult> {
        anyhow::bail!("database unavailable")
    };
    let err = scope
        .on_content(&mut host, String::new(), &failing)
        .unwrap_err();
    assert!(matches!(err, almanac::EngineError::Query(_)));

    assert_eq!(scope.injector_state(), InjectorState::Restored);
    assert_eq!(host.records.len(), 1);
    assert!(!host.has_next());
}

#[test]
fn test_secondary_loops_are_untouched() {
    let (_root, config) = site();
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(host_page_settings())))
        .default_views()
        .build()
        .unwrap();

    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("list")))
        .unwrap();
    scope.choose_template(PathBuf::from("/host/index.php")).unwrap();
    let mut host = ResultSet::new(vec![]);
    scope.on_head(&mut host);

    // A sidebar widget loops before the head is finished, then after.
    assert!(!scope.on_loop_start(true));
    scope.on_head_finished();
    assert!(!scope.on_loop_start(false));

    let mut widget = ResultSet::new(vec![record(9, "Widget")]);
    let out = scope
        .on_content(&mut widget, "widget body".into(), &source)
        .unwrap();
    assert_eq!(out, "widget body");
    assert_eq!(scope.injector_state(), InjectorState::AwaitingLoop);
}

#[test]
fn test_plugin_default_mode_never_injects() {
    let (_root, config) = site();
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::default()))
        .default_views()
        .build()
        .unwrap();

    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("list")))
        .unwrap();
    let mut host = ResultSet::new(vec![]);
    assert!(!scope.on_head(&mut host));
    scope.on_head_finished();
    assert!(!scope.on_loop_start(true));
    assert_eq!(scope.injector_state(), InjectorState::Idle);
}

#[test]
fn test_comments_hidden_on_listings() {
    let (root, config) = site();
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(Settings {
            show_comments: true,
            ..host_page_settings()
        })))
        .default_views()
        .build()
        .unwrap();

    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("list")))
        .unwrap();
    scope.choose_template(PathBuf::from("/host/index.php")).unwrap();
    let mut host = ResultSet::new(vec![]);
    scope.on_head(&mut host);
    scope.on_head_finished();
    scope.on_loop_start(true);

    let theme_comments = PathBuf::from("/themes/site/comments.php");
    assert_eq!(
        scope.on_comments_template(theme_comments.clone()),
        root.path().join("plugin/src/admin-views/no-comments.php")
    );
    assert_eq!(scope.on_comments_template(theme_comments.clone()), theme_comments);
}

fn title_guarded_scope(engine: &Engine) -> almanac::RequestScope<'_> {
    let mut scope = engine
        .request(RequestContext::page(QueryFlags::events("list")))
        .unwrap();
    scope.choose_template(PathBuf::from("/host/index.php")).unwrap();
    scope
}

fn title_guarded_engine(config: EngineConfig) -> Engine {
    Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(Settings {
            modify_global_title: true,
            ..host_page_settings()
        })))
        .default_views()
        .build()
        .unwrap()
}

#[test]
fn test_title_blanked_until_view_renders() {
    let (_root, config) = site();
    let engine = title_guarded_engine(config);
    let mut scope = title_guarded_scope(&engine);

    // Without a placeholder nothing rewinds the current record.
    let mut host = ResultSet::new(vec![record(3, "Latest Event")]);
    let title = scope.on_document_title(&mut host, "Events | Site".into());
    assert_eq!(title, "Events | Site");
    assert_eq!(host.current.as_ref().unwrap().title, "");

    scope.on_head_finished();
    scope.on_loop_start(true);
    scope.on_content(&mut host, String::new(), &source).unwrap();
    assert_eq!(host.current.as_ref().unwrap().title, "Latest Event");
}

#[test]
fn test_title_after_placeholder_keeps_real_title() {
    let (_root, config) = site();
    let engine = title_guarded_engine(config);
    let mut scope = title_guarded_scope(&engine);

    let mut host = ResultSet::new(vec![record(3, "Latest Event")]);
    scope.on_head(&mut host);
    scope.on_document_title(&mut host, "Events | Site".into());
    scope.on_head_finished();
    scope.on_loop_start(true);
    scope.on_content(&mut host, String::new(), &source).unwrap();

    assert_eq!(host.current.as_ref().unwrap().title, "Latest Event");
    assert_eq!(host.records[0].title, "Latest Event");
}

#[test]
fn test_body_classes_for_host_page() {
    let (root, config) = site();
    let engine = Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(host_page_settings())))
        .default_views()
        .build()
        .unwrap();

    let mut query = QueryFlags::events("list");
    query.post_type = Some("tribe_events".into());
    let mut scope = engine.request(RequestContext::page(query)).unwrap();
    let choice = scope.choose_template(PathBuf::from("/host/index.php")).unwrap();
    assert_eq!(choice.path(), root.path().join("themes/site/page.php"));

    let classes = scope.body_classes(vec![]);
    assert_eq!(
        classes,
        vec![
            "tribe-theme-site",
            "page-template-page-php",
            "tribe-filter-live",
            "events-list",
            "events-archive",
            "tribe-events-style-full",
            "tribe-events-style-theme",
            "singular",
        ]
    );
}

fn arb_record() -> impl Strategy<Value = Record> {
    (any::<u64>(), "[A-Za-z ]{0,12}", "(publish|private|draft)").prop_map(|(id, title, status)| {
        Record {
            id,
            title,
            status,
            post_type: "tribe_events".into(),
            ..Record::default()
        }
    })
}

proptest! {
    #[test]
    fn prop_placeholder_round_trip(records in proptest::collection::vec(arb_record(), 0..5)) {
        let original = ResultSet::new(records);
        let mut host = original.clone();

        host.begin_fake_iteration(Record::placeholder());
        prop_assert_eq!(host.count, original.count + 1);
        host.end_fake_iteration();

        prop_assert_eq!(host, original);
    }
}
