//! View selection across the registry, settings and request signals.

use std::rc::Rc;

use almanac::{
    MemoryStore, PostedParams, QueryFlags, RequestContext, Settings, SettingsStore, ViewKind,
    ViewRegistry, ViewSelector,
};
use proptest::prelude::*;

fn registry(settings: Settings) -> (ViewRegistry, Rc<MemoryStore>) {
    let store = Rc::new(MemoryStore::new(settings));
    let mut registry = ViewRegistry::new(store.clone());
    for kind in ViewKind::DEFAULTS {
        registry.register_kind(kind);
    }
    (registry, store)
}

#[test]
fn test_stale_default_heals_to_enabled_view() {
    let (registry, store) = registry(Settings {
        enabled_views: vec!["month".into()],
        default_view: "list".into(),
        ..Settings::default()
    });
    let selector = ViewSelector::new(&registry);
    let ctx = RequestContext::default();

    assert_eq!(selector.select(&ctx).unwrap().as_deref(), Some("month"));
    assert_eq!(store.load().default_view, "month");
    assert_eq!(store.writes(), 1);

    assert_eq!(selector.select(&ctx).unwrap().as_deref(), Some("month"));
    assert_eq!(store.writes(), 1);
}

#[test]
fn test_posted_view_beats_action() {
    let (registry, _) = registry(Settings::default());
    let ctx = RequestContext::ajax(PostedParams::from_pairs([
        ("action", "tribe_calendar"),
        ("tribe_event_display", "day"),
    ]));

    assert_eq!(
        ViewSelector::new(&registry).select(&ctx).unwrap().as_deref(),
        Some("day")
    );
}

#[test]
fn test_query_signal_beats_ajax_signal() {
    let (registry, _) = registry(Settings::default());
    let mut ctx = RequestContext::ajax(PostedParams::from_pairs([("action", "tribe_calendar")]));
    ctx.query = QueryFlags::events("list");

    assert_eq!(
        ViewSelector::new(&registry).select(&ctx).unwrap().as_deref(),
        Some("list")
    );
}

#[test]
fn test_enable_twice() {
    let (registry, store) = registry(Settings {
        enabled_views: vec![],
        ..Settings::default()
    });

    assert!(registry.enable("list").unwrap());
    assert!(!registry.enable("list").unwrap());
    assert_eq!(store.load().enabled_views, vec!["list"]);
}

fn enabled_subset() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(vec!["list", "month", "day"], 0..=3)
        .prop_map(|ids| ids.into_iter().map(String::from).collect())
}

proptest! {
    #[test]
    fn prop_selection_is_enabled_and_stable(
        enabled in enabled_subset(),
        default in "(list|month|day|photo)",
        requested in proptest::option::of("(list|month|day|photo)"),
    ) {
        let (registry, store) = registry(Settings {
            enabled_views: enabled.clone(),
            default_view: default,
            ..Settings::default()
        });
        let selector = ViewSelector::new(&registry);
        let ctx = RequestContext::page(match &requested {
            Some(view) => QueryFlags::events(view.as_str()),
            None => QueryFlags::default(),
        });

        let first = selector.select(&ctx).unwrap();
        match &first {
            Some(id) => prop_assert!(enabled.contains(id)),
            None => prop_assert!(enabled.is_empty()),
        }
        prop_assert!(store.writes() <= 1);

        let writes = store.writes();
        let second = selector.select(&ctx).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(store.writes(), writes);
    }
}
