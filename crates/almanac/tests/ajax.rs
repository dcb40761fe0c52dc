//! Asynchronous view responses.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::rc::Rc;

use almanac::{
    Engine, EngineConfig, EngineError, HookError, HookPhase, Hooks, MemoryStore, PostedParams,
    QueryArgs, QueryResult, RequestContext, Settings, StatusPolicy,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn site() -> (TempDir, EngineConfig) {
    let root = tempfile::tempdir().unwrap();
    let list = root.path().join("plugin/src/views/list.php");
    fs::create_dir_all(list.parent().unwrap()).unwrap();
    fs::write(
        &list,
        "<ul>{% for e in items %}<li>{{ e.title }}</li>{% endfor %}</ul> page {{ page }}",
    )
    .unwrap();
    fs::create_dir_all(root.path().join("themes/site")).unwrap();

    let config = EngineConfig::new(root.path().join("plugin"), root.path().join("themes/site"));
    (root, config)
}

fn engine_with(config: EngineConfig, settings: Settings, hooks: Hooks) -> Engine {
    Engine::builder(config)
        .settings(Rc::new(MemoryStore::new(settings)))
        .hooks(hooks)
        .default_views()
        .build()
        .unwrap()
}

fn posted(pairs: &[(&str, &str)]) -> RequestContext {
    RequestContext::ajax(PostedParams::from_pairs(pairs.iter().copied()))
}

/// An event source that records the arguments it was queried with.
fn recording(seen: &RefCell<Vec<QueryArgs>>) -> impl Fn(&QueryArgs) -> anyhow::Result<QueryResult> + '_ {
    move |args| {
        seen.borrow_mut().push(args.clone());
        Ok(QueryResult {
            items: vec![json!({"title": "Jazz Night"})],
            max_pages: 3,
            total_count: 7,
        })
    }
}

#[test]
fn test_list_payload() {
    let (_root, config) = site();
    let engine = engine_with(config, Settings::default(), Hooks::new());
    let scope = engine
        .request(posted(&[("action", "tribe_list"), ("tribe_paged", "2")]))
        .unwrap();

    let seen = RefCell::new(Vec::new());
    let response = scope.ajax_response(&recording(&seen)).unwrap();
    assert_eq!(response.content_type, Some("application/json"));

    let mut body: BTreeMap<String, Value> = serde_json::from_str(&response.body).unwrap();
    let hash = body.insert("hash".into(), json!("[hash]")).unwrap();
    assert_eq!(hash.as_str().unwrap().len(), 64);
    assert_eq!(hash, json!(seen.borrow()[0].hash()));

    insta::assert_json_snapshot!(body, @r#"
    {
      "hash": "[hash]",
      "html": "<ul><li>Jazz Night</li></ul> page 2",
      "max_pages": 3,
      "success": true,
      "total_count": 7,
      "view": "list"
    }
    "#);
}

#[test]
fn test_stale_hash_restarts_pagination() {
    let (_root, config) = site();
    let engine = engine_with(config, Settings::default(), Hooks::new());
    let seen = RefCell::new(Vec::new());

    let stale = engine
        .request(posted(&[("action", "tribe_list"), ("tribe_paged", "5"), ("hash", "abc")]))
        .unwrap();
    stale.ajax_response(&recording(&seen)).unwrap();

    let current = QueryArgs::from_posted(
        "list",
        &PostedParams::default(),
        "tribe_events",
        &StatusPolicy::default(),
        false,
    )
    .hash();
    let fresh = engine
        .request(posted(&[
            ("action", "tribe_list"),
            ("tribe_paged", "5"),
            ("hash", current.as_str()),
        ]))
        .unwrap();
    fresh.ajax_response(&recording(&seen)).unwrap();

    let pages: Vec<u32> = seen.borrow().iter().map(|a| a.paged).collect();
    assert_eq!(pages, vec![1, 5]);
}

#[test]
fn test_paging_survives_query_args_filter() {
    let (_root, config) = site();
    let hooks = Hooks::new().query_args(|_, mut args| {
        args["tribe_events_cat"] = json!("jazz");
        Ok(args)
    });
    let engine = engine_with(config, Settings::default(), hooks);
    let seen = RefCell::new(Vec::new());

    let first = engine.request(posted(&[("action", "tribe_list")])).unwrap();
    let response = first.ajax_response(&recording(&seen)).unwrap();
    let body: Value = serde_json::from_str(&response.body).unwrap();
    let hash = body["hash"].as_str().unwrap().to_string();

    let next = engine
        .request(posted(&[
            ("action", "tribe_list"),
            ("tribe_paged", "2"),
            ("hash", hash.as_str()),
        ]))
        .unwrap();
    next.ajax_response(&recording(&seen)).unwrap();

    let pages: Vec<u32> = seen.borrow().iter().map(|a| a.paged).collect();
    assert_eq!(pages, vec![1, 2]);
}

#[test]
fn test_no_view_answers_empty() {
    let (_root, config) = site();
    let settings = Settings {
        enabled_views: vec![],
        ..Settings::default()
    };
    let engine = engine_with(config, settings, Hooks::new());
    let scope = engine.request(posted(&[("action", "tribe_list")])).unwrap();
    assert!(!scope.has_selected_view());

    let response = scope
        .ajax_response(&|_: &QueryArgs| -> anyhow::Result<QueryResult> {
            panic!("no query without a view")
        })
        .unwrap();
    assert!(response.is_empty());
    assert_eq!(response.content_type, None);
}

#[test]
fn test_raw_filter_sees_empty_body() {
    let (_root, config) = site();
    let settings = Settings {
        enabled_views: vec![],
        ..Settings::default()
    };
    let hooks = Hooks::new().response_raw(|_, body| Ok(format!("[{}]", body)));
    let engine = engine_with(config, settings, hooks);
    let scope = engine.request(posted(&[])).unwrap();

    let response = scope
        .ajax_response(&|_: &QueryArgs| -> anyhow::Result<QueryResult> {
            Ok(QueryResult::default())
        })
        .unwrap();
    assert_eq!(response.body, "[]");
}

#[test]
fn test_query_args_filter_reaches_source() {
    let (_root, config) = site();
    let hooks = Hooks::new().query_args(|ctx, mut args| {
        assert_eq!(ctx.view.as_deref(), Some("list"));
        args["tribe_events_cat"] = json!("jazz");
        Ok(args)
    });
    let engine = engine_with(config, Settings::default(), hooks);
    let scope = engine.request(posted(&[("action", "tribe_list")])).unwrap();

    let seen = RefCell::new(Vec::new());
    let response = scope.ajax_response(&recording(&seen)).unwrap();

    let args = &seen.borrow()[0];
    assert_eq!(args.category.as_deref(), Some("jazz"));
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["hash"], json!(args.hash()));
}

#[test]
fn test_invalid_query_args_from_filter() {
    let (_root, config) = site();
    let hooks = Hooks::new().query_args(|_, _| Ok(json!("not an object")));
    let engine = engine_with(config, Settings::default(), hooks);
    let scope = engine.request(posted(&[("action", "tribe_list")])).unwrap();

    let seen = RefCell::new(Vec::new());
    let err = scope.ajax_response(&recording(&seen)).unwrap_err();
    assert!(matches!(err, EngineError::QueryArgs(_)));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_response_filter_error() {
    let (_root, config) = site();
    let hooks = Hooks::new()
        .response(|_, _| Err(HookError::new(HookPhase::Response, "payload rejected")));
    let engine = engine_with(config, Settings::default(), hooks);
    let scope = engine.request(posted(&[("action", "tribe_list")])).unwrap();

    let seen = RefCell::new(Vec::new());
    match scope.ajax_response(&recording(&seen)) {
        Err(EngineError::Hook(e)) => assert_eq!(e.phase, HookPhase::Response),
        other => panic!("expected hook error, got {:?}", other),
    };
}

#[test]
fn test_source_failure() {
    let (_root, config) = site();
    let engine = engine_with(config, Settings::default(), Hooks::new());
    let scope = engine.request(posted(&[("action", "tribe_list")])).unwrap();

    let err = scope
        .ajax_response(&|_: &QueryArgs| -> anyhow::Result<QueryResult> {
            anyhow::bail!("database unavailable")
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::Query(_)));
    assert!(err.to_string().contains("database unavailable"));
}

#[test]
fn test_ajax_actions() {
    let (_root, config) = site();
    let engine = engine_with(config, Settings::default(), Hooks::new());

    let scope = engine.request(posted(&[("action", "tribe_calendar")])).unwrap();
    assert_eq!(
        scope.ajax_actions(),
        vec!["wp_ajax_tribe_calendar", "wp_ajax_nopriv_tribe_calendar"]
    );

    let page = engine.request(RequestContext::default()).unwrap();
    assert!(page.ajax_actions().is_empty());
}
